//! # VANTAGE UI Core
//!
//! Server-authoritative widget model for in-game overlay HUDs:
//! - Arena-backed widget tree with id-based parent/child links
//! - Min/max size negotiation and proportional layout distribution
//! - Typed attribute stores with per-key dirty tracking
//! - Frame-based widget animation
//!
//! All coordinates live on a fixed 427x240 virtual canvas; the renderer
//! scales to real pixels. The host mutates widgets between ticks, then
//! [`WidgetTree::tick`] settles sizes, layout, and animations in one
//! pass so the sync layer sees a consistent snapshot.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vantage_ui::{WidgetKind, WidgetTree};
//!
//! let mut tree = WidgetTree::new();
//! let hud = tree.create(WidgetKind::Container);
//! let label = tree.create(WidgetKind::Label);
//! tree.attach(label, hud, None)?;
//! tree.tick_all();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod attr;
pub mod canvas;
pub mod error;
mod layout;
pub mod style;
pub mod tree;
pub mod widget;

pub use animation::{anim_flags, AnimKind, AnimState};
pub use attr::{AttrKey, AttrKind, AttrValue, AttributeStore};
pub use canvas::{Canvas, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
pub use error::UiError;
pub use style::Color;
pub use tree::{IdAllocator, WidgetTree, FIRST_DYNAMIC_ID};
pub use widget::{
    Anchor, ContainerState, LayoutMode, Margin, RenderPriority, Widget, WidgetId, WidgetKind,
    BASE_WIRE_VERSION,
};
