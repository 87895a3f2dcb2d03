//! Arena-backed widget tree with id-based parent/child links.
//!
//! All propagation (size negotiation triggers, layout scheduling, owner
//! purges) runs through the tree so the widgets themselves stay plain
//! data. Mutators mirror the widget-level setters but add the
//! invalidation side effects the layout engine depends on.

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::error::UiError;
use crate::widget::{ContainerState, LayoutMode, Margin, Widget, WidgetId, WidgetKind};

/// Ids below this value are reserved for static, well-known widgets.
pub const FIRST_DYNAMIC_ID: u32 = 16;

/// Monotonic id source owned by the tree.
///
/// Replaces the legacy global mutable counter: the allocator is threaded
/// through widget creation by whoever owns the tree.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator starting at the first dynamic id.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: FIRST_DYNAMIC_ID,
        }
    }

    /// Hands out the next id.
    pub fn alloc(&mut self) -> WidgetId {
        let id = WidgetId(self.next);
        self.next += 1;
        id
    }

    /// Ensures future allocations stay above an externally assigned id.
    pub fn reserve(&mut self, id: WidgetId) {
        if id.0 >= self.next && id != WidgetId::UNASSIGNED {
            self.next = id.0 + 1;
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The widget arena plus the hierarchy between widgets.
#[derive(Debug, Clone)]
pub struct WidgetTree {
    widgets: HashMap<WidgetId, Widget>,
    roots: Vec<WidgetId>,
    ids: IdAllocator,
    canvas: Canvas,
}

impl WidgetTree {
    /// Creates an empty tree on the default 427x240 canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_canvas(Canvas::default())
    }

    /// Creates an empty tree on an explicit canvas.
    #[must_use]
    pub fn with_canvas(canvas: Canvas) -> Self {
        Self {
            widgets: HashMap::with_capacity(64),
            roots: Vec::with_capacity(4),
            ids: IdAllocator::new(),
            canvas,
        }
    }

    /// The canvas all bounds are clamped to.
    #[must_use]
    pub const fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Creates a new widget of the given kind as a detached root.
    pub fn create(&mut self, kind: WidgetKind) -> WidgetId {
        self.insert(Widget::new(kind))
    }

    /// Inserts a prepared widget, assigning it a fresh dynamic id.
    pub fn insert(&mut self, mut widget: Widget) -> WidgetId {
        let id = self.ids.alloc();
        widget.id = id;
        widget.parent = None;
        self.widgets.insert(id, widget);
        self.roots.push(id);
        id
    }

    /// Inserts a widget under a reserved static id.
    ///
    /// # Errors
    ///
    /// [`UiError::StaticIdRange`] if `id` is not below
    /// [`FIRST_DYNAMIC_ID`]; [`UiError::StaticIdTaken`] if occupied.
    pub fn insert_static(&mut self, id: u32, mut widget: Widget) -> Result<WidgetId, UiError> {
        if id >= FIRST_DYNAMIC_ID {
            return Err(UiError::StaticIdRange(id));
        }
        let id = WidgetId(id);
        if self.widgets.contains_key(&id) {
            return Err(UiError::StaticIdTaken(id.0));
        }
        widget.id = id;
        widget.parent = None;
        self.widgets.insert(id, widget);
        self.roots.push(id);
        Ok(id)
    }

    /// Inserts a widget decoded from the wire under its remote id.
    ///
    /// Replaces any widget already stored under that id and keeps the
    /// local allocator clear of the remote range.
    pub fn insert_remote(&mut self, id: WidgetId, mut widget: Widget) {
        widget.id = id;
        widget.parent = None;
        self.ids.reserve(id);
        if self.widgets.insert(id, widget).is_none() {
            self.roots.push(id);
        }
    }

    /// Looks a widget up by id.
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    /// Looks a widget up mutably.
    ///
    /// Direct mutation skips tree propagation; prefer the `set_*` methods
    /// for anything layout-relevant.
    #[must_use]
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    /// Whether the id is present in the arena.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// Number of widgets in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Detached/top-level widget ids.
    #[must_use]
    pub fn roots(&self) -> &[WidgetId] {
        &self.roots
    }

    /// Ordered children of a container; empty for other widgets.
    #[must_use]
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.widgets
            .get(&id)
            .and_then(Widget::container)
            .map_or(&[], ContainerState::children)
    }

    /// All ids in the subtree rooted at `id`, depth first, `id` included.
    #[must_use]
    pub fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.widgets.contains_key(&current) {
                continue;
            }
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Iterates every widget in the arena, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&WidgetId, &Widget)> {
        self.widgets.iter()
    }

    /// Iterates every widget mutably, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&WidgetId, &mut Widget)> {
        self.widgets.iter_mut()
    }

    /// Finds a widget by id anywhere under `root`, deep.
    #[must_use]
    pub fn child_of(&self, root: WidgetId, id: WidgetId) -> bool {
        // Direct children first for speed, then down the tree.
        let direct = self.children(root);
        if direct.contains(&id) {
            return true;
        }
        direct.iter().any(|&child| self.child_of(child, id))
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Attaches `child` to `parent`, optionally at an index.
    ///
    /// Reparenting detaches from the previous parent first; out-of-range
    /// indices append. Schedules size negotiation and layout on the new
    /// parent.
    ///
    /// # Errors
    ///
    /// [`UiError::NotAContainer`] if `parent` has no child list.
    pub fn attach(
        &mut self,
        child: WidgetId,
        parent: WidgetId,
        index: Option<usize>,
    ) -> Result<(), UiError> {
        if !self.widgets.contains_key(&child) || !self.widgets.contains_key(&parent) {
            return Ok(()); // structurally a no-op, not an error
        }
        if self.widgets.get(&parent).is_some_and(|w| !w.is_container()) {
            return Err(UiError::NotAContainer(parent.0));
        }
        self.detach(child);
        self.roots.retain(|&r| r != child);
        if let Some(widget) = self.widgets.get_mut(&child) {
            widget.parent = Some(parent);
        }
        if let Some(state) = self.container_mut(parent) {
            match index {
                Some(i) if i <= state.children.len() => state.children.insert(i, child),
                _ => state.children.push(child),
            }
            state.needs_size = true;
            state.needs_layout = true;
        }
        Ok(())
    }

    /// Detaches a widget from its parent; no-op when already detached.
    ///
    /// The former parent renegotiates size immediately and re-lays out on
    /// its next tick. The widget becomes a root again.
    pub fn detach(&mut self, child: WidgetId) {
        let Some(parent) = self.widgets.get(&child).and_then(Widget::parent) else {
            return;
        };
        if let Some(state) = self.container_mut(parent) {
            state.children.retain(|&c| c != child);
        }
        if let Some(widget) = self.widgets.get_mut(&child) {
            widget.parent = None;
        }
        if !self.roots.contains(&child) {
            self.roots.push(child);
        }
        self.update_size(parent);
        self.defer_layout(parent);
    }

    /// Removes a widget and its whole subtree from the arena.
    pub fn remove(&mut self, id: WidgetId) {
        self.detach(id);
        for gone in self.subtree(id) {
            self.widgets.remove(&gone);
            self.roots.retain(|&r| r != gone);
        }
    }

    /// Removes every widget owned by the given tag, recursively.
    pub fn remove_owned(&mut self, owner: &str) {
        let doomed: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|(_, w)| w.owner() == owner)
            .map(|(&id, _)| id)
            .collect();
        let count = doomed.len();
        for id in doomed {
            if self.contains(id) {
                self.remove(id);
            }
        }
        if count > 0 {
            tracing::info!("purged {count} widgets owned by {owner}");
        }
    }

    // ------------------------------------------------------------------
    // Invalidation scheduling
    // ------------------------------------------------------------------

    pub(crate) fn container_mut(&mut self, id: WidgetId) -> Option<&mut ContainerState> {
        self.widgets.get_mut(&id).and_then(|w| w.container.as_mut())
    }

    /// Requests a size negotiation pass on the next tick.
    pub fn defer_size(&mut self, id: WidgetId) {
        if let Some(state) = self.container_mut(id) {
            state.needs_size = true;
        }
    }

    /// Requests a layout pass on the next tick.
    pub fn defer_layout(&mut self, id: WidgetId) {
        if let Some(state) = self.container_mut(id) {
            state.needs_layout = true;
        }
    }

    /// Routes a geometry change to the container that must renegotiate:
    /// containers renegotiate themselves, leaves notify their parent.
    fn notify_size_changed(&mut self, id: WidgetId) {
        let Some(widget) = self.widgets.get(&id) else {
            return;
        };
        if widget.is_container() {
            self.update_size(id);
        } else if let Some(parent) = widget.parent() {
            self.update_size(parent);
        }
    }

    // ------------------------------------------------------------------
    // Propagating mutators
    // ------------------------------------------------------------------

    /// Moves the left edge; position changes never trigger renegotiation.
    pub fn set_x(&mut self, id: WidgetId, x: i32) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.set_x(x);
        }
    }

    /// Moves the top edge.
    pub fn set_y(&mut self, id: WidgetId, y: i32) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.set_y(y);
        }
    }

    /// Sets the width and renegotiates sizes when it changed.
    pub fn set_width(&mut self, id: WidgetId, width: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_width(width))
        {
            self.notify_size_changed(id);
        }
    }

    /// Sets the height and renegotiates sizes when it changed.
    pub fn set_height(&mut self, id: WidgetId, height: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_height(height))
        {
            self.notify_size_changed(id);
        }
    }

    /// Sets the minimum width bound.
    pub fn set_min_width(&mut self, id: WidgetId, min: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_min_width(min))
        {
            self.notify_size_changed(id);
        }
    }

    /// Sets the maximum width bound.
    pub fn set_max_width(&mut self, id: WidgetId, max: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_max_width(max))
        {
            self.notify_size_changed(id);
        }
    }

    /// Sets the minimum height bound.
    pub fn set_min_height(&mut self, id: WidgetId, min: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_min_height(min))
        {
            self.notify_size_changed(id);
        }
    }

    /// Sets the maximum height bound.
    pub fn set_max_height(&mut self, id: WidgetId, max: i32) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_max_height(max))
        {
            self.notify_size_changed(id);
        }
    }

    /// Replaces the margin box.
    pub fn set_margin(&mut self, id: WidgetId, margin: Margin) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_margin(margin))
        {
            self.notify_size_changed(id);
        }
    }

    /// Toggles visibility; hidden widgets leave layout entirely.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_visible(visible))
        {
            self.notify_size_changed(id);
            if let Some(parent) = self.widgets.get(&id).and_then(Widget::parent) {
                self.defer_layout(parent);
            }
        }
    }

    /// Toggles the fixed-size flag.
    pub fn set_fixed(&mut self, id: WidgetId, fixed: bool) {
        if self
            .widgets
            .get_mut(&id)
            .is_some_and(|w| w.set_fixed(fixed))
        {
            self.notify_size_changed(id);
        }
    }

    /// Changes a container's layout mode.
    pub fn set_layout_mode(&mut self, id: WidgetId, mode: LayoutMode) {
        if let Some(state) = self.container_mut(id) {
            if state.layout_mode != mode {
                state.layout_mode = mode;
                state.needs_layout = true;
            }
        }
    }

    /// Changes how the laid-out block aligns inside the container.
    pub fn set_align(&mut self, id: WidgetId, align: crate::widget::Anchor) {
        if let Some(state) = self.container_mut(id) {
            if state.align != align {
                state.align = align;
                state.needs_layout = true;
            }
        }
    }

    /// Reverses child iteration order.
    pub fn set_reverse(&mut self, id: WidgetId, reverse: bool) {
        if let Some(state) = self.container_mut(id) {
            if state.reverse != reverse {
                state.reverse = reverse;
                state.needs_layout = true;
            }
        }
    }

    /// Toggles fill-available-space sizing.
    pub fn set_auto(&mut self, id: WidgetId, auto: bool) {
        if let Some(state) = self.container_mut(id) {
            if state.auto != auto {
                state.auto = auto;
                state.needs_layout = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Runs one host tick over the subtree rooted at `id`.
    ///
    /// Consumes pending size/layout requests, recurses into children,
    /// then advances every widget's animation machine.
    pub fn tick(&mut self, id: WidgetId) {
        let (needs_size, needs_layout) = self
            .widgets
            .get(&id)
            .and_then(Widget::container)
            .map_or((false, false), |c| (c.needs_size, c.needs_layout));
        if needs_size {
            self.update_size(id);
        }
        if needs_layout {
            self.update_layout(id);
        }
        for child in self.children(id).to_vec() {
            self.tick(child);
        }
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.anim.advance();
        }
    }

    /// Ticks every static root in insertion order.
    ///
    /// Dynamic roots are widgets that were created but never attached
    /// (or replicated orphans); they stay outside the hierarchy and are
    /// neither laid out nor animated until attached.
    pub fn tick_all(&mut self) {
        let roots: Vec<WidgetId> = self
            .roots
            .iter()
            .copied()
            .filter(|root| root.raw() < FIRST_DYNAMIC_ID)
            .collect();
        for root in roots {
            self.tick(root);
        }
    }

    /// Ids of every widget attached under a static root, parents before
    /// children.
    ///
    /// This is the sync walk: detached widgets are excluded until they
    /// are attached into the hierarchy.
    #[must_use]
    pub fn attached_ids(&self) -> Vec<WidgetId> {
        self.roots
            .iter()
            .copied()
            .filter(|root| root.raw() < FIRST_DYNAMIC_ID)
            .flat_map(|root| self.subtree(root))
            .collect()
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_above_static_range() {
        let mut tree = WidgetTree::new();
        let id = tree.create(WidgetKind::Frame);
        assert_eq!(id.raw(), FIRST_DYNAMIC_ID);
        let next = tree.create(WidgetKind::Frame);
        assert_eq!(next.raw(), FIRST_DYNAMIC_ID + 1);
    }

    #[test]
    fn test_static_id_rules() {
        let mut tree = WidgetTree::new();
        let id = tree.insert_static(3, Widget::new(WidgetKind::Frame)).unwrap();
        assert_eq!(id.raw(), 3);
        assert_eq!(
            tree.insert_static(3, Widget::new(WidgetKind::Frame)),
            Err(UiError::StaticIdTaken(3))
        );
        assert_eq!(
            tree.insert_static(16, Widget::new(WidgetKind::Frame)),
            Err(UiError::StaticIdRange(16))
        );
    }

    #[test]
    fn test_tick_all_skips_detached_roots() {
        let mut tree = WidgetTree::new();
        let hud = tree
            .insert_static(0, Widget::new(WidgetKind::Container))
            .unwrap();
        let stray = tree.create(WidgetKind::Container);
        tree.tick_all();

        // The static root settled; the detached container did not run.
        assert!(!tree.get(hud).unwrap().container().unwrap().needs_layout());
        let state = tree.get(stray).unwrap().container().unwrap();
        assert!(state.needs_size());
        assert!(state.needs_layout());
    }

    #[test]
    fn test_attached_ids_covers_static_hierarchy_only() {
        let mut tree = WidgetTree::new();
        let hud = tree
            .insert_static(0, Widget::new(WidgetKind::Container))
            .unwrap();
        let label = tree.create(WidgetKind::Label);
        tree.attach(label, hud, None).unwrap();
        let stray = tree.create(WidgetKind::Frame);

        let ids = tree.attached_ids();
        assert_eq!(ids, vec![hud, label]);
        assert!(!ids.contains(&stray));
    }

    #[test]
    fn test_attach_detach_reparent() {
        let mut tree = WidgetTree::new();
        let a = tree.create(WidgetKind::Container);
        let b = tree.create(WidgetKind::Container);
        let child = tree.create(WidgetKind::Frame);

        tree.attach(child, a, None).unwrap();
        assert_eq!(tree.children(a), &[child]);
        assert_eq!(tree.get(child).unwrap().parent(), Some(a));
        assert!(!tree.roots().contains(&child));

        // Reparent: leaves `a` first.
        tree.attach(child, b, None).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[child]);

        // Detach is idempotent.
        tree.detach(child);
        tree.detach(child);
        assert_eq!(tree.get(child).unwrap().parent(), None);
        assert!(tree.roots().contains(&child));
    }

    #[test]
    fn test_attach_to_leaf_fails() {
        let mut tree = WidgetTree::new();
        let leaf = tree.create(WidgetKind::Label);
        let child = tree.create(WidgetKind::Frame);
        assert_eq!(
            tree.attach(child, leaf, None),
            Err(UiError::NotAContainer(leaf.raw()))
        );
    }

    #[test]
    fn test_attach_at_index() {
        let mut tree = WidgetTree::new();
        let parent = tree.create(WidgetKind::Container);
        let a = tree.create(WidgetKind::Frame);
        let b = tree.create(WidgetKind::Frame);
        let c = tree.create(WidgetKind::Frame);
        tree.attach(a, parent, None).unwrap();
        tree.attach(b, parent, None).unwrap();
        tree.attach(c, parent, Some(1)).unwrap();
        assert_eq!(tree.children(parent), &[a, c, b]);
    }

    #[test]
    fn test_remove_owned_purges_subtrees() {
        let mut tree = WidgetTree::new();
        let root = tree.create(WidgetKind::Container);
        let mine = tree.create(WidgetKind::Label);
        let theirs = tree.create(WidgetKind::Label);
        tree.get_mut(theirs).unwrap().set_owner("minimap");
        tree.attach(mine, root, None).unwrap();
        tree.attach(theirs, root, None).unwrap();

        tree.remove_owned("minimap");
        assert!(tree.contains(mine));
        assert!(!tree.contains(theirs));
        assert_eq!(tree.children(root), &[mine]);
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = WidgetTree::new();
        let outer = tree.create(WidgetKind::Container);
        let inner = tree.create(WidgetKind::Container);
        let leaf = tree.create(WidgetKind::Frame);
        tree.attach(inner, outer, None).unwrap();
        tree.attach(leaf, inner, None).unwrap();

        tree.remove(inner);
        assert!(tree.contains(outer));
        assert!(!tree.contains(inner));
        assert!(!tree.contains(leaf));
    }
}
