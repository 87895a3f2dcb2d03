//! The concrete widget node.
//!
//! One struct carries everything the legacy deep inheritance chain spread
//! over five classes: geometry with enforced min/max bounds, margins,
//! anchoring, render priority, ownership, dirty tracking, animation state
//! and the typed attribute store. Kind-specific behavior hangs off the
//! small [`WidgetKind`] enum instead of virtual dispatch.
//!
//! Widget-level setters are side-effect free with respect to the tree:
//! they clamp, compare, apply and mark dirty, and report whether anything
//! changed so [`crate::tree::WidgetTree`] can schedule size negotiation
//! and layout. Decoded sync records use the same setters.

use crate::animation::AnimState;
use crate::attr::AttributeStore;
use crate::canvas::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::widget::container::ContainerState;

/// Base wire version of the widget envelope.
///
/// Concrete kinds add their own delta on top (additive schema chain).
pub const BASE_WIRE_VERSION: u32 = 5;

/// Unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u32);

impl WidgetId {
    /// Sentinel for widgets not yet inserted into a tree.
    pub const UNASSIGNED: Self = Self(u32::MAX);

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// The concrete kinds a widget can be, with stable wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WidgetKind {
    /// Undecorated rectangle, useful as a spacer or backdrop.
    #[default]
    Frame = 0,
    /// Owns an ordered child list and a layout mode.
    Container = 1,
    /// Draws attribute-driven text.
    Label = 2,
    /// Clickable control with a caption.
    Button = 3,
}

impl WidgetKind {
    /// Returns the stable wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks a kind up by wire id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Frame),
            1 => Some(Self::Container),
            2 => Some(Self::Label),
            3 => Some(Self::Button),
            _ => None,
        }
    }

    /// Kind-specific version delta added to [`BASE_WIRE_VERSION`].
    #[must_use]
    pub const fn version_delta(self) -> u32 {
        match self {
            Self::Frame | Self::Container => 0,
            Self::Label => 1,
            Self::Button => 2,
        }
    }

    /// Complete wire version for this kind's envelope.
    #[must_use]
    pub const fn wire_version(self) -> u32 {
        BASE_WIRE_VERSION + crate::attr::AttrKey::COUNT as u32 + self.version_delta()
    }
}

/// Four-sided margin box in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    /// Top inset.
    pub top: i32,
    /// Right inset.
    pub right: i32,
    /// Bottom inset.
    pub bottom: i32,
    /// Left inset.
    pub left: i32,
}

impl Margin {
    /// Same inset on all four sides.
    #[must_use]
    pub const fn uniform(all: i32) -> Self {
        Self {
            top: all,
            right: all,
            bottom: all,
            left: all,
        }
    }

    /// Vertical/horizontal inset pairs.
    #[must_use]
    pub const fn symmetric(top_bottom: i32, left_right: i32) -> Self {
        Self {
            top: top_bottom,
            right: left_right,
            bottom: top_bottom,
            left: left_right,
        }
    }

    /// Explicit insets in CSS order.
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Combined left + right inset.
    #[must_use]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Combined top + bottom inset.
    #[must_use]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Screen-relative anchor points, plus the legacy canvas-stretch anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft = 0,
    /// Top edge, centered.
    TopCenter = 1,
    /// Top-right corner.
    TopRight = 2,
    /// Left edge, centered.
    CenterLeft = 3,
    /// Dead center.
    Center = 4,
    /// Right edge, centered.
    CenterRight = 5,
    /// Bottom-left corner.
    BottomLeft = 6,
    /// Bottom edge, centered.
    BottomCenter = 7,
    /// Bottom-right corner.
    BottomRight = 8,
    /// Legacy anchor: stretch relative to the whole virtual canvas.
    #[default]
    Scale = 9,
}

impl Anchor {
    /// Returns the stable wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks an anchor up by wire id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::TopLeft),
            1 => Some(Self::TopCenter),
            2 => Some(Self::TopRight),
            3 => Some(Self::CenterLeft),
            4 => Some(Self::Center),
            5 => Some(Self::CenterRight),
            6 => Some(Self::BottomLeft),
            7 => Some(Self::BottomCenter),
            8 => Some(Self::BottomRight),
            9 => Some(Self::Scale),
            _ => None,
        }
    }

    /// Whether the horizontal component centers the block.
    #[must_use]
    pub const fn centers_horizontally(self) -> bool {
        matches!(self, Self::TopCenter | Self::Center | Self::BottomCenter)
    }

    /// Whether the horizontal component right-aligns the block.
    #[must_use]
    pub const fn aligns_right(self) -> bool {
        matches!(self, Self::TopRight | Self::CenterRight | Self::BottomRight)
    }

    /// Whether the vertical component centers the block.
    #[must_use]
    pub const fn centers_vertically(self) -> bool {
        matches!(self, Self::CenterLeft | Self::Center | Self::CenterRight)
    }

    /// Whether the vertical component bottom-aligns the block.
    #[must_use]
    pub const fn aligns_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomCenter | Self::BottomRight)
    }
}

/// Draw ordering hint synced with every widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RenderPriority {
    /// Drawn first, behind everything.
    Highest = 0,
    /// Drawn early.
    High = 1,
    /// Default layer.
    #[default]
    Normal = 2,
    /// Drawn late.
    Low = 3,
    /// Drawn last, on top of everything.
    Lowest = 4,
}

impl RenderPriority {
    /// Returns the stable wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks a priority up by wire id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Highest),
            1 => Some(Self::High),
            2 => Some(Self::Normal),
            3 => Some(Self::Low),
            4 => Some(Self::Lowest),
            _ => None,
        }
    }
}

/// A node in the widget tree.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Assigned by the tree on insertion.
    pub(crate) id: WidgetId,
    kind: WidgetKind,
    /// Parent container, if attached.
    pub(crate) parent: Option<WidgetId>,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    min_width: i32,
    max_width: i32,
    min_height: i32,
    max_height: i32,
    margin: Margin,
    anchor: Anchor,
    priority: RenderPriority,
    tooltip: String,
    owner: String,
    visible: bool,
    fixed: bool,
    enabled: bool,
    dirty: bool,
    auto_dirty: bool,
    saved_pos: Option<(i32, i32)>,
    /// Animation state machine, advanced once per host tick.
    pub anim: AnimState,
    /// Typed attribute store with its own dirty set.
    pub attrs: AttributeStore,
    /// Present iff `kind == WidgetKind::Container`.
    pub(crate) container: Option<ContainerState>,
}

/// Default owner tag for widgets created by the host itself.
pub(crate) const DEFAULT_OWNER: &str = "vantage";

impl Widget {
    /// Creates a detached widget of the given kind with legacy defaults.
    #[must_use]
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            id: WidgetId::UNASSIGNED,
            kind,
            parent: None,
            x: 0,
            y: 0,
            width: 50,
            height: 50,
            min_width: 0,
            max_width: DEFAULT_CANVAS_WIDTH,
            min_height: 0,
            max_height: DEFAULT_CANVAS_HEIGHT,
            margin: Margin::default(),
            anchor: Anchor::Scale,
            priority: RenderPriority::Normal,
            tooltip: String::new(),
            owner: DEFAULT_OWNER.to_owned(),
            visible: true,
            fixed: false,
            enabled: true,
            dirty: true,
            auto_dirty: true,
            saved_pos: None,
            anim: AnimState::idle(),
            attrs: AttributeStore::new(),
            container: if matches!(kind, WidgetKind::Container) {
                Some(ContainerState::new())
            } else {
                None
            },
        }
    }

    /// The widget's id; [`WidgetId::UNASSIGNED`] before tree insertion.
    #[must_use]
    pub const fn id(&self) -> WidgetId {
        self.id
    }

    /// The widget's concrete kind.
    #[must_use]
    pub const fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// The parent container, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Whether this widget owns a child list.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.container.is_some()
    }

    /// Container layout state, for container widgets.
    #[must_use]
    pub const fn container(&self) -> Option<&ContainerState> {
        self.container.as_ref()
    }

    /// Mutable container layout state, for container widgets.
    ///
    /// Mutations made here bypass tree scheduling; pair structural
    /// changes with [`WidgetTree`](crate::WidgetTree) mutators.
    #[must_use]
    pub fn container_mut(&mut self) -> Option<&mut ContainerState> {
        self.container.as_mut()
    }

    /// Left edge in canvas units.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top edge in canvas units.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Current width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Current height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Minimum width honored by setters and layout.
    #[must_use]
    pub const fn min_width(&self) -> i32 {
        self.min_width
    }

    /// Maximum width honored by setters and layout.
    #[must_use]
    pub const fn max_width(&self) -> i32 {
        self.max_width
    }

    /// Minimum height honored by setters and layout.
    #[must_use]
    pub const fn min_height(&self) -> i32 {
        self.min_height
    }

    /// Maximum height honored by setters and layout.
    #[must_use]
    pub const fn max_height(&self) -> i32 {
        self.max_height
    }

    /// The margin box.
    #[must_use]
    pub const fn margin(&self) -> Margin {
        self.margin
    }

    /// The screen anchor.
    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The render priority.
    #[must_use]
    pub const fn priority(&self) -> RenderPriority {
        self.priority
    }

    /// The hover tooltip text.
    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Tag of the plugin responsible for this widget.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether the widget participates in layout and drawing.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the widget opts out of container-driven resizing.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Whether the widget accepts interaction; only meaningful for
    /// clickable kinds.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the widget needs a sync to remote observers.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets or clears the sync-needed flag.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Whether mutators mark the widget dirty automatically.
    #[must_use]
    pub const fn is_auto_dirty(&self) -> bool {
        self.auto_dirty
    }

    /// Controls automatic dirty marking by mutators.
    pub fn set_auto_dirty(&mut self, auto_dirty: bool) {
        self.auto_dirty = auto_dirty;
    }

    /// Marks dirty if automatic dirty marking is enabled.
    pub fn auto_dirty(&mut self) {
        if self.auto_dirty {
            self.dirty = true;
        }
    }

    /// Moves the left edge. Returns whether anything changed.
    pub fn set_x(&mut self, x: i32) -> bool {
        if self.x == x {
            return false;
        }
        self.x = x;
        self.auto_dirty();
        true
    }

    /// Moves the top edge. Returns whether anything changed.
    pub fn set_y(&mut self, y: i32) -> bool {
        if self.y == y {
            return false;
        }
        self.y = y;
        self.auto_dirty();
        true
    }

    /// Sets the width, clamped to `[min_width, max_width]`.
    ///
    /// Returns whether anything changed.
    pub fn set_width(&mut self, width: i32) -> bool {
        let width = width.clamp(self.min_width, self.max_width);
        if self.width == width {
            return false;
        }
        self.width = width;
        self.auto_dirty();
        true
    }

    /// Sets the height, clamped to `[min_height, max_height]`.
    ///
    /// Returns whether anything changed.
    pub fn set_height(&mut self, height: i32) -> bool {
        let height = height.clamp(self.min_height, self.max_height);
        if self.height == height {
            return false;
        }
        self.height = height;
        self.auto_dirty();
        true
    }

    /// Sets the minimum width and re-enforces the current width.
    pub fn set_min_width(&mut self, min: i32) -> bool {
        let min = min.max(0);
        if self.min_width == min {
            return false;
        }
        self.min_width = min;
        self.set_width(self.width);
        self.auto_dirty();
        true
    }

    /// Sets the maximum width and re-enforces the current width.
    ///
    /// Non-positive maxima widen to the default canvas width, matching the
    /// legacy wire semantics.
    pub fn set_max_width(&mut self, max: i32) -> bool {
        let max = if max <= 0 { DEFAULT_CANVAS_WIDTH } else { max };
        if self.max_width == max {
            return false;
        }
        self.max_width = max;
        self.set_width(self.width);
        self.auto_dirty();
        true
    }

    /// Sets the minimum height and re-enforces the current height.
    pub fn set_min_height(&mut self, min: i32) -> bool {
        let min = min.max(0);
        if self.min_height == min {
            return false;
        }
        self.min_height = min;
        self.set_height(self.height);
        self.auto_dirty();
        true
    }

    /// Sets the maximum height and re-enforces the current height.
    pub fn set_max_height(&mut self, max: i32) -> bool {
        let max = if max <= 0 { DEFAULT_CANVAS_HEIGHT } else { max };
        if self.max_height == max {
            return false;
        }
        self.max_height = max;
        self.set_height(self.height);
        self.auto_dirty();
        true
    }

    /// Replaces the whole margin box. Returns whether anything changed.
    pub fn set_margin(&mut self, margin: Margin) -> bool {
        if self.margin == margin {
            return false;
        }
        self.margin = margin;
        self.auto_dirty();
        true
    }

    /// Sets the anchor. Returns whether anything changed.
    pub fn set_anchor(&mut self, anchor: Anchor) -> bool {
        if self.anchor == anchor {
            return false;
        }
        self.anchor = anchor;
        self.auto_dirty();
        true
    }

    /// Sets the render priority. Returns whether anything changed.
    pub fn set_priority(&mut self, priority: RenderPriority) -> bool {
        if self.priority == priority {
            return false;
        }
        self.priority = priority;
        self.auto_dirty();
        true
    }

    /// Sets the tooltip text. Returns whether anything changed.
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) -> bool {
        let tooltip = tooltip.into();
        if self.tooltip == tooltip {
            return false;
        }
        self.tooltip = tooltip;
        self.auto_dirty();
        true
    }

    /// Sets the owner tag; empty tags fall back to the host default.
    pub fn set_owner(&mut self, owner: impl Into<String>) -> bool {
        let mut owner = owner.into();
        if owner.is_empty() {
            owner = DEFAULT_OWNER.to_owned();
        }
        if self.owner == owner {
            return false;
        }
        self.owner = owner;
        self.auto_dirty();
        true
    }

    /// Toggles visibility. Returns whether anything changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        self.auto_dirty();
        true
    }

    /// Toggles the fixed-size flag. Returns whether anything changed.
    pub fn set_fixed(&mut self, fixed: bool) -> bool {
        if self.fixed == fixed {
            return false;
        }
        self.fixed = fixed;
        true
    }

    /// Toggles interactivity for clickable kinds. Returns whether
    /// anything changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        self.auto_dirty();
        true
    }

    /// Remembers the current position for a later [`Widget::restore_pos`].
    pub fn save_pos(&mut self) {
        self.saved_pos = Some((self.x, self.y));
    }

    /// Moves back to the last saved position, if any.
    pub fn restore_pos(&mut self) {
        if let Some((x, y)) = self.saved_pos {
            self.set_x(x);
            self.set_y(y);
        }
    }

    /// Produces a detached copy with all public state cloned.
    ///
    /// The copy has no id, no parent and, for containers, an empty child
    /// list; attach it and add children explicitly.
    #[must_use]
    pub fn copy(&self) -> Self {
        let mut copy = self.clone();
        copy.id = WidgetId::UNASSIGNED;
        copy.parent = None;
        copy.dirty = true;
        if let Some(container) = copy.container.as_mut() {
            container.children.clear();
            container.needs_size = true;
            container.needs_layout = true;
            container.recalculating = false;
        }
        copy
    }
}
