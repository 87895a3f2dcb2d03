//! Widget model: the single concrete node type plus its container state.

mod container;
mod core;

pub use container::{ContainerState, LayoutMode};
pub use core::{Anchor, Margin, RenderPriority, Widget, WidgetId, WidgetKind, BASE_WIRE_VERSION};
