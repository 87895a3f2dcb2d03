//! The host-side session loop.
//!
//! `HostSession` glues the widget model to the sync codec: one tree, one
//! root container pinned to the canvas, one [`SyncSession`]. The host
//! calls [`HostSession::tick`] at its configured rate and shuttles the
//! drained packets over whatever transport it uses.

use vantage_protocol::{DecodeError, SyncSession};
use vantage_ui::{Widget, WidgetId, WidgetKind, WidgetTree};

use crate::config::VantageConfig;

/// Static id of the canvas-sized root container.
pub const ROOT_WIDGET_ID: u32 = 0;

/// A complete host: widget tree, root container, and sync state.
#[derive(Debug)]
pub struct HostSession {
    config: VantageConfig,
    tree: WidgetTree,
    root: WidgetId,
    sync: SyncSession,
}

impl Default for HostSession {
    fn default() -> Self {
        Self::new(VantageConfig::default())
    }
}

impl HostSession {
    /// Creates a session with a canvas-sized, fixed root container.
    #[must_use]
    pub fn new(config: VantageConfig) -> Self {
        let canvas = config.canvas();
        let mut tree = WidgetTree::with_canvas(canvas);
        // A fresh tree cannot hold the root id yet, so the fallback arm
        // never changes the outcome.
        let root = tree
            .insert_static(ROOT_WIDGET_ID, Widget::new(WidgetKind::Container))
            .unwrap_or(WidgetId(ROOT_WIDGET_ID));
        tree.set_max_width(root, canvas.width);
        tree.set_max_height(root, canvas.height);
        tree.set_width(root, canvas.width);
        tree.set_height(root, canvas.height);
        tree.set_fixed(root, true);
        let sync = SyncSession::with_max_string_len(config.max_string_len);
        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            tick_rate = config.tick_rate,
            "host session created"
        );
        Self {
            config,
            tree,
            root,
            sync,
        }
    }

    /// The configuration this session was built from.
    #[must_use]
    pub const fn config(&self) -> &VantageConfig {
        &self.config
    }

    /// The widget tree.
    #[must_use]
    pub const fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Mutable access to the widget tree.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    /// Id of the root container.
    #[must_use]
    pub const fn root(&self) -> WidgetId {
        self.root
    }

    /// Creates a widget of `kind` and attaches it under the root.
    pub fn spawn(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.tree.create(kind);
        let attached = self.tree.attach(id, self.root, None);
        debug_assert!(attached.is_ok(), "the root is always a container");
        id
    }

    /// Runs one simulation step.
    ///
    /// Settles deferred size and layout work, advances animations, then
    /// snapshots every dirty widget into the outbox. Returns the number
    /// of widgets captured this tick.
    pub fn tick(&mut self) -> usize {
        self.tree.tick_all();
        self.sync.collect(&mut self.tree)
    }

    /// Takes all packets queued since the last drain, oldest first.
    #[must_use]
    pub fn drain_outbox(&mut self) -> Vec<Vec<u8>> {
        self.sync.drain()
    }

    /// Number of packets waiting in the outbox.
    #[must_use]
    pub fn pending_packets(&self) -> usize {
        self.sync.pending()
    }

    /// Applies a packet received from a remote host to this tree.
    ///
    /// Returns the number of widget records applied.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] aborts the rest of the packet; records
    /// already applied stay applied.
    pub fn apply_remote(&mut self, bytes: &[u8]) -> Result<usize, DecodeError> {
        self.sync.apply(&mut self.tree, bytes)
    }
}
