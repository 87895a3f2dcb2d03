//! Container-only layout state.

use crate::canvas::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::widget::{Anchor, WidgetId};

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LayoutMode {
    /// Children stacked top to bottom; heights share the space.
    #[default]
    Vertical = 0,
    /// Children placed left to right; widths share the space.
    Horizontal = 1,
    /// Children stacked in place, each filling the container.
    Overlay = 2,
}

impl LayoutMode {
    /// Returns the stable wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks a mode up by wire id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Vertical),
            1 => Some(Self::Horizontal),
            2 => Some(Self::Overlay),
            _ => None,
        }
    }
}

/// Layout bookkeeping carried by every container widget.
///
/// The `*_calc` fields cache the negotiated aggregate bounds from the
/// last size pass; layout reuses them without re-walking children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    /// Ordered child list; order drives layout and reverse draw order.
    pub(crate) children: Vec<WidgetId>,
    /// Arrangement mode.
    pub layout_mode: LayoutMode,
    /// How the laid-out block sits inside the container when smaller.
    pub align: Anchor,
    /// Reverses child iteration for sizing and positioning.
    pub reverse: bool,
    /// When set, children are stretched to fill available space; when
    /// clear, children default to their minimum size.
    pub auto: bool,
    /// Negotiated aggregate minimum width.
    pub min_width_calc: i32,
    /// Negotiated aggregate maximum width.
    pub max_width_calc: i32,
    /// Negotiated aggregate minimum height.
    pub min_height_calc: i32,
    /// Negotiated aggregate maximum height.
    pub max_height_calc: i32,
    /// Re-entrancy guard around size negotiation and layout.
    ///
    /// Trickle-down and push-up propagation would otherwise recurse
    /// through the same container indefinitely.
    pub(crate) recalculating: bool,
    /// Layout pass requested; consumed once per tick.
    pub(crate) needs_layout: bool,
    /// Size negotiation requested; consumed once per tick.
    pub(crate) needs_size: bool,
}

impl ContainerState {
    /// Creates the default state: vertical, top-left, auto-sizing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            layout_mode: LayoutMode::Vertical,
            align: Anchor::TopLeft,
            reverse: false,
            auto: true,
            min_width_calc: 0,
            max_width_calc: DEFAULT_CANVAS_WIDTH,
            min_height_calc: 0,
            max_height_calc: DEFAULT_CANVAS_HEIGHT,
            recalculating: false,
            needs_layout: true,
            needs_size: true,
        }
    }

    /// Ordered child ids.
    #[must_use]
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// Whether a layout pass is pending.
    #[must_use]
    pub const fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Whether a size negotiation pass is pending.
    #[must_use]
    pub const fn needs_size(&self) -> bool {
        self.needs_size
    }

    /// Requests a layout pass on the next tick.
    pub fn invalidate_layout(&mut self) {
        self.needs_layout = true;
    }
}

impl Default for ContainerState {
    fn default() -> Self {
        Self::new()
    }
}
