//! Size negotiation and child placement for container widgets.
//!
//! Two passes, both scheduled through the dirty flags on
//! [`ContainerState`](crate::widget::ContainerState) and consumed by
//! [`WidgetTree::tick`]:
//!
//! * `update_size` runs bottom-up. It aggregates child bounds into the
//!   container's cached `*_calc` fields and, when they change, pushes
//!   the change up to the parent while the re-entrancy guard is held.
//! * `update_layout` runs top-down. It splits the container's available
//!   extent along the main axis, resizes non-fixed children, then walks
//!   a cursor to place everyone, honoring margins and block alignment.

use crate::tree::WidgetTree;
use crate::widget::{LayoutMode, Margin, Widget, WidgetId};

/// Per-child geometry snapshot taken before layout mutates anything.
struct ChildMetrics {
    id: WidgetId,
    fixed: bool,
    width: i32,
    height: i32,
    min_width: i32,
    max_width: i32,
    min_height: i32,
    max_height: i32,
    margin: Margin,
}

impl ChildMetrics {
    fn capture(widget: &Widget) -> Self {
        Self {
            id: widget.id(),
            fixed: widget.is_fixed(),
            width: widget.width(),
            height: widget.height(),
            min_width: widget.min_width(),
            max_width: widget.max_width(),
            min_height: widget.min_height(),
            max_height: widget.max_height(),
            margin: widget.margin(),
        }
    }
}

/// Splits `avail` evenly among children, pinning any child whose bounds
/// reject its share and redistributing the remainder until a share
/// satisfies every still-flexible child.
///
/// `bounds` holds the (min, max) main-axis bounds of the non-fixed
/// children. Terminates because each round either pins a child or
/// returns.
fn flex_share(avail: i32, bounds: &[(i32, i32)]) -> i32 {
    let mut flex: Vec<(i32, i32)> = bounds.to_vec();
    let mut pinned = 0i32;
    loop {
        let count = flex.len().max(1) as i32;
        let share = (avail - pinned) / count;
        if flex.is_empty() {
            return share.max(0);
        }
        if let Some(pos) = flex
            .iter()
            .position(|&(min, max)| min > share || share > max)
        {
            let (min, max) = flex.remove(pos);
            pinned += if min > share { min } else { max };
        } else {
            return share.max(0);
        }
    }
}

/// Clamps in the order min-then-max loses to min, so a minimum above the
/// maximum still wins.
const fn bounded(value: i32, min: i32, max: i32) -> i32 {
    let capped = if value < max { value } else { max };
    if capped > min {
        capped
    } else {
        min
    }
}

impl WidgetTree {
    /// Renegotiates a container's aggregate min/max bounds from its
    /// visible children, bottom-up.
    ///
    /// No-op for leaves and fixed-size containers. Re-entrant calls
    /// return immediately; the guard stays held while a changed result
    /// is pushed up to the parent, so trickle-down and push-up cannot
    /// chase each other in a cycle.
    pub fn update_size(&mut self, id: WidgetId) {
        let Some(widget) = self.get(id) else {
            return;
        };
        let fixed = widget.is_fixed();
        let Some(state) = widget.container() else {
            return;
        };
        let mode = state.layout_mode;
        if state.recalculating || fixed {
            if let Some(state) = self.container_mut(id) {
                state.needs_size = false;
            }
            return;
        }
        if let Some(state) = self.container_mut(id) {
            state.recalculating = true;
        }

        // Child containers renegotiate first so the sums below see
        // settled bounds.
        let children = self.children(id).to_vec();
        for &child in &children {
            if self.get(child).is_some_and(Widget::is_container) {
                self.update_size(child);
            }
        }

        let mut min_width = 0i32;
        let mut min_height = 0i32;
        let mut max_width: Option<i32> = None;
        let mut max_height: Option<i32> = None;
        for &child in &children {
            let Some(widget) = self.get(child) else {
                continue;
            };
            if !widget.is_visible() {
                continue;
            }
            let margin = widget.margin();
            let (min_h, max_h, min_v, max_v) = if widget.is_fixed() {
                (
                    margin.horizontal() + widget.width(),
                    margin.horizontal() + widget.width(),
                    margin.vertical() + widget.height(),
                    margin.vertical() + widget.height(),
                )
            } else {
                (
                    margin.horizontal() + widget.min_width(),
                    margin.horizontal() + widget.max_width(),
                    margin.vertical() + widget.min_height(),
                    margin.vertical() + widget.max_height(),
                )
            };
            match mode {
                LayoutMode::Horizontal => {
                    min_width += min_h;
                    max_width = Some(max_width.unwrap_or(0) + max_h);
                    min_height = min_height.max(min_v);
                    max_height = Some(max_height.map_or(max_v, |m| m.min(max_v)));
                }
                LayoutMode::Vertical => {
                    min_height += min_v;
                    max_height = Some(max_height.unwrap_or(0) + max_v);
                    min_width = min_width.max(min_h);
                    max_width = Some(max_width.map_or(max_h, |m| m.min(max_h)));
                }
                LayoutMode::Overlay => {
                    min_width = min_width.max(min_h);
                    max_width = Some(max_width.map_or(max_h, |m| m.max(max_h)));
                    min_height = min_height.max(min_v);
                    max_height = Some(max_height.map_or(max_v, |m| m.max(max_v)));
                }
            }
        }

        let canvas = self.canvas();
        let min_width = canvas.clamp_min(min_width, true);
        let min_height = canvas.clamp_min(min_height, false);
        let max_width = canvas.clamp_max(max_width.unwrap_or(0), true);
        let max_height = canvas.clamp_max(max_height.unwrap_or(0), false);

        let (changed, parent) = match (self.get(id), self.get(id).and_then(Widget::container)) {
            (Some(widget), Some(state)) => (
                min_width != state.min_width_calc
                    || max_width != state.max_width_calc
                    || min_height != state.min_height_calc
                    || max_height != state.max_height_calc,
                widget.parent(),
            ),
            _ => (false, None),
        };
        if changed {
            if let Some(state) = self.container_mut(id) {
                state.min_width_calc = min_width;
                state.max_width_calc = max_width;
                state.min_height_calc = min_height;
                state.max_height_calc = max_height;
                state.needs_layout = true;
            }
            tracing::trace!(
                id = id.raw(),
                min_width,
                max_width,
                min_height,
                max_height,
                "renegotiated container bounds"
            );
            // Push up while the guard is still held.
            if let Some(parent) = parent {
                self.update_size(parent);
                self.defer_layout(parent);
            }
        }
        if let Some(state) = self.container_mut(id) {
            state.recalculating = false;
            state.needs_size = false;
        }
    }

    /// Resizes and places a container's visible children, top-down.
    ///
    /// Skipped while the container has no on-screen extent or a size
    /// pass is already running; the pending flag clears either way.
    pub fn update_layout(&mut self, id: WidgetId) {
        let ready = self.get(id).and_then(|widget| {
            let state = widget.container()?;
            Some(
                !state.recalculating
                    && widget.width() > 0
                    && widget.height() > 0
                    && !state.children.is_empty(),
            )
        });
        if ready != Some(true) {
            if let Some(state) = self.container_mut(id) {
                state.needs_layout = false;
            }
            return;
        }
        if let Some(state) = self.container_mut(id) {
            state.recalculating = true;
        }
        self.layout_children(id);
        if let Some(state) = self.container_mut(id) {
            state.recalculating = false;
            state.needs_layout = false;
        }
    }

    /// The body of `update_layout`, entered with the guard held.
    fn layout_children(&mut self, id: WidgetId) {
        let Some(widget) = self.get(id) else {
            return;
        };
        let Some(state) = widget.container() else {
            return;
        };
        let mode = state.layout_mode;
        let align = state.align;
        let auto = state.auto;
        let reverse = state.reverse;
        let own_x = widget.x();
        let own_y = widget.y();
        let own_width = widget.width();
        let own_height = widget.height();
        let avail_width = if auto { own_width } else { widget.min_width() };
        let avail_height = if auto { own_height } else { widget.min_height() };

        // Only visible children take part; hidden ones have no physical
        // presence on screen.
        let mut metrics: Vec<ChildMetrics> = self
            .children(id)
            .iter()
            .filter_map(|&child| self.get(child))
            .filter(|w| w.is_visible())
            .map(ChildMetrics::capture)
            .collect();
        if reverse {
            metrics.reverse();
        }
        if metrics.is_empty() {
            return;
        }

        // Share out the main axis; the cross axis offers the full extent
        // to every child.
        let (share_width, share_height) = match mode {
            LayoutMode::Overlay => (avail_width, avail_height),
            LayoutMode::Vertical => {
                let mut avail = avail_height;
                let mut bounds = Vec::with_capacity(metrics.len());
                for m in &metrics {
                    avail -= m.margin.vertical();
                    if m.fixed {
                        avail -= m.height;
                    } else {
                        bounds.push((m.min_height, m.max_height));
                    }
                }
                (avail_width, flex_share(avail, &bounds))
            }
            LayoutMode::Horizontal => {
                let mut avail = avail_width;
                let mut bounds = Vec::with_capacity(metrics.len());
                for m in &metrics {
                    avail -= m.margin.horizontal();
                    if m.fixed {
                        avail -= m.width;
                    } else {
                        bounds.push((m.min_width, m.max_width));
                    }
                }
                (flex_share(avail, &bounds), avail_height)
            }
        };

        // Resize the non-fixed children. Margins come off any axis that
        // is not being shared out, since the shared axis already
        // accounted for them.
        for m in &metrics {
            if m.fixed {
                continue;
            }
            let h_margin = m.margin.horizontal();
            let v_margin = m.margin.vertical();
            let (target_width, target_height) = if auto {
                let width_offset = if mode == LayoutMode::Horizontal { 0 } else { h_margin };
                let height_offset = if mode == LayoutMode::Vertical { 0 } else { v_margin };
                (
                    bounded(share_width - width_offset, m.min_width, m.max_width),
                    bounded(share_height - height_offset, m.min_height, m.max_height),
                )
            } else {
                (
                    if m.min_width == 0 {
                        share_width - h_margin
                    } else {
                        m.min_width
                    },
                    if m.min_height == 0 {
                        share_height - v_margin
                    } else {
                        m.min_height
                    },
                )
            };
            if let Some(child) = self.get_mut(m.id) {
                let resized = child.set_width(target_width) | child.set_height(target_height);
                if resized {
                    if let Some(state) = child.container.as_mut() {
                        state.needs_size = true;
                        state.needs_layout = true;
                    }
                }
            }
        }

        // Measure the laid-out block from the actual post-clamp sizes.
        let mut total_width = 0i32;
        let mut total_height = 0i32;
        for m in &metrics {
            let Some(child) = self.get(m.id) else {
                continue;
            };
            let with_h = child.width() + m.margin.horizontal();
            let with_v = child.height() + m.margin.vertical();
            if mode == LayoutMode::Horizontal {
                total_width += with_h;
            } else {
                total_width = total_width.max(with_h);
            }
            if mode == LayoutMode::Vertical {
                total_height += with_v;
            } else {
                total_height = total_height.max(with_v);
            }
        }

        // Align the block inside the container, then walk the cursor.
        let mut left = own_x;
        let mut top = own_y;
        if align.centers_horizontally() {
            left += (own_width - total_width) / 2;
        } else if align.aligns_right() {
            left += own_width - total_width;
        }
        if align.centers_vertically() {
            top += (own_height - total_height) / 2;
        } else if align.aligns_bottom() {
            top += own_height - total_height;
        }
        for m in &metrics {
            let Some(child) = self.get_mut(m.id) else {
                continue;
            };
            child.set_y(top + m.margin.top);
            child.set_x(left + m.margin.left);
            match mode {
                LayoutMode::Vertical => top += child.height() + m.margin.vertical(),
                LayoutMode::Horizontal => left += child.width() + m.margin.horizontal(),
                LayoutMode::Overlay => {}
            }
        }
    }
}
