//! Per-connection sync state.
//!
//! The host side snapshots every dirty widget into one packet per tick
//! and clears the dirty indicators in the same pass, so a diff is sent
//! exactly once. The observer side overlays decoded records onto its
//! replica tree by id.
//!
//! The outbox sits behind a mutex because the transport drains from its
//! own thread; everything else here runs on the tick thread.

use parking_lot::Mutex;

use vantage_ui::{WidgetId, WidgetTree};

use crate::codec::{ByteReader, ByteWriter, MAX_STRING_LEN};
use crate::diff::{decode_diff_with_limit, encode_diff};
use crate::envelope::WidgetRecord;
use crate::error::DecodeError;

/// Collects outgoing sync packets and applies incoming ones.
#[derive(Debug)]
pub struct SyncSession {
    outbox: Mutex<Vec<Vec<u8>>>,
    max_string_len: i32,
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncSession {
    /// Creates a session with an empty outbox and the wire-format
    /// string cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_string_len(MAX_STRING_LEN)
    }

    /// Creates a session that rejects incoming strings longer than
    /// `max_string_len` code units.
    #[must_use]
    pub fn with_max_string_len(max_string_len: i32) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            max_string_len,
        }
    }

    /// Snapshots every dirty attached widget into one packet.
    ///
    /// The walk covers the hierarchy under the tree's static roots;
    /// widgets created but never attached are not synced. Each record is
    /// length-prefixed (envelope + attribute diff); both the widget
    /// dirty flag and the attribute dirty set are cleared as the record
    /// is written. Returns the number of widgets captured.
    pub fn collect(&self, tree: &mut WidgetTree) -> usize {
        let ids: Vec<WidgetId> = tree.attached_ids();
        let mut packet = ByteWriter::new();
        let mut count = 0usize;
        for id in ids {
            let Some(widget) = tree.get_mut(id) else {
                continue;
            };
            if !widget.is_dirty() && !widget.attrs.is_dirty() {
                continue;
            }
            let mut record = ByteWriter::new();
            WidgetRecord::capture(widget).encode(&mut record);
            encode_diff(&mut record, &widget.attrs);
            widget.set_dirty(false);
            widget.attrs.clear_dirty();
            packet.write_packed(record.len() as i32);
            packet.write_bytes(record.as_slice());
            count += 1;
        }
        if count > 0 {
            tracing::debug!(widgets = count, bytes = packet.len(), "collected sync packet");
            self.outbox.lock().push(packet.into_bytes());
        }
        count
    }

    /// Hands all pending packets to the transport, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Number of packets waiting in the outbox.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbox.lock().len()
    }

    /// Applies one received packet to a replica tree.
    ///
    /// Records overlay existing widgets by id; unknown ids insert fresh
    /// replicas. A kind change replaces the widget outright. Returns the
    /// number of records applied.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] aborts the rest of the packet; records
    /// already applied stay applied.
    pub fn apply(&self, tree: &mut WidgetTree, bytes: &[u8]) -> Result<usize, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let mut count = 0usize;
        while !reader.is_exhausted() {
            let len = reader.read_packed()?;
            let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength(len))?;
            let mut record_reader = ByteReader::new(reader.read_bytes(len)?);
            let record = WidgetRecord::decode_with_limit(&mut record_reader, self.max_string_len)?;
            let id = record.id;
            match tree.get_mut(id) {
                Some(widget) if widget.kind() == record.kind => {
                    record.apply_to(widget);
                    decode_diff_with_limit(&mut record_reader, &mut widget.attrs, self.max_string_len)?;
                }
                _ => {
                    let mut widget = record.into_widget();
                    decode_diff_with_limit(&mut record_reader, &mut widget.attrs, self.max_string_len)?;
                    tree.insert_remote(id, widget);
                }
            }
            // Replicas never echo diffs back.
            if let Some(widget) = tree.get_mut(id) {
                widget.set_dirty(false);
                widget.attrs.clear_dirty();
            }
            count += 1;
        }
        tracing::debug!(widgets = count, "applied sync packet");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_ui::{AttrKey, AttrValue, Color, Widget, WidgetKind};

    /// A tree with a static root container, the sync walk's entry point.
    fn tree_with_root() -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree
            .insert_static(0, Widget::new(WidgetKind::Container))
            .unwrap();
        (tree, root)
    }

    fn spawn(tree: &mut WidgetTree, root: WidgetId, kind: WidgetKind) -> WidgetId {
        let id = tree.create(kind);
        tree.attach(id, root, None).unwrap();
        id
    }

    fn sync_once(host: &mut WidgetTree, replica: &mut WidgetTree) -> usize {
        let session = SyncSession::new();
        session.collect(host);
        let mut applied = 0;
        for packet in session.drain() {
            applied += session.apply(replica, &packet).unwrap();
        }
        applied
    }

    #[test]
    fn test_new_widgets_replicate() {
        let (mut host, root) = tree_with_root();
        let label = spawn(&mut host, root, WidgetKind::Label);
        {
            let widget = host.get_mut(label).unwrap();
            widget.set_x(40);
            widget
                .attrs
                .set(AttrKey::Text, AttrValue::Str("Gold: 112".into()))
                .unwrap();
        }
        let mut replica = WidgetTree::new();
        assert_eq!(sync_once(&mut host, &mut replica), 2); // root + label

        let mirrored = replica.get(label).expect("replicated widget");
        assert_eq!(mirrored.kind(), WidgetKind::Label);
        assert_eq!(mirrored.x(), 40);
        assert!(host
            .get(label)
            .unwrap()
            .attrs
            .observably_equal(&mirrored.attrs));
    }

    #[test]
    fn test_clean_widgets_are_skipped() {
        let (mut host, root) = tree_with_root();
        let a = spawn(&mut host, root, WidgetKind::Frame);
        let session = SyncSession::new();
        assert_eq!(session.collect(&mut host), 2);
        assert_eq!(session.pending(), 1);
        let _ = session.drain();

        // Nothing changed since the first collect.
        assert_eq!(session.collect(&mut host), 0);
        assert_eq!(session.pending(), 0);

        host.set_x(a, 9);
        assert_eq!(session.collect(&mut host), 1);
    }

    #[test]
    fn test_detached_widgets_are_not_collected() {
        let (mut host, root) = tree_with_root();
        spawn(&mut host, root, WidgetKind::Frame);
        let stray = host.create(WidgetKind::Label);

        let session = SyncSession::new();
        assert_eq!(session.collect(&mut host), 2); // root + frame, no stray
        assert!(host.get(stray).unwrap().is_dirty());

        // Attaching brings it into the sync walk.
        host.attach(stray, root, None).unwrap();
        assert_eq!(session.collect(&mut host), 1);
    }

    #[test]
    fn test_incremental_attr_update_overlays() {
        let (mut host, root) = tree_with_root();
        let label = spawn(&mut host, root, WidgetKind::Label);
        host.get_mut(label)
            .unwrap()
            .attrs
            .set(AttrKey::Badge, AttrValue::Str("!".into()))
            .unwrap();
        let mut replica = WidgetTree::new();
        sync_once(&mut host, &mut replica);

        // Second tick: clear the badge, recolor.
        {
            let widget = host.get_mut(label).unwrap();
            widget.attrs.clear(AttrKey::Badge);
            widget
                .attrs
                .set(AttrKey::TextColor, AttrValue::Color(Color::BLACK))
                .unwrap();
        }
        sync_once(&mut host, &mut replica);
        let mirrored = replica.get(label).unwrap();
        assert!(!mirrored.attrs.has(AttrKey::Badge));
        assert!(host
            .get(label)
            .unwrap()
            .attrs
            .observably_equal(&mirrored.attrs));
    }

    #[test]
    fn test_corrupt_packet_aborts() {
        let (mut host, root) = tree_with_root();
        spawn(&mut host, root, WidgetKind::Frame);
        let session = SyncSession::new();
        session.collect(&mut host);
        let mut packet = session.drain().remove(0);
        let last = packet.len() - 1;
        packet.truncate(last);

        let mut replica = WidgetTree::new();
        assert!(session.apply(&mut replica, &packet).is_err());
    }

    #[test]
    fn test_replica_does_not_redirty() {
        let (mut host, root) = tree_with_root();
        let id = spawn(&mut host, root, WidgetKind::Button);
        host.get_mut(id).unwrap().set_enabled(false);
        let mut replica = WidgetTree::new();
        sync_once(&mut host, &mut replica);

        let session = SyncSession::new();
        assert_eq!(session.collect(&mut replica), 0);
    }
}
