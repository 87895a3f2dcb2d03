//! End-to-end host/replica synchronization.
//!
//! Drives a full `HostSession` through mutate/tick/drain cycles and
//! applies the drained packets to a second session, checking that the
//! replica converges on the host's tree.

use vantage::ui::{
    AttrKey, AttrValue, Color, LayoutMode, Widget, WidgetId, WidgetKind,
};
use vantage::{HostSession, VantageConfig};

/// Ships every pending packet from `host` to `replica`.
fn sync(host: &mut HostSession, replica: &mut HostSession) -> usize {
    let mut applied = 0;
    for packet in host.drain_outbox() {
        applied += replica.apply_remote(&packet).unwrap();
    }
    applied
}

fn assert_mirrored(host: &HostSession, replica: &HostSession, id: WidgetId) {
    let a = host.tree().get(id).unwrap();
    let b = replica.tree().get(id).unwrap();
    assert_eq!(a.kind(), b.kind(), "kind diverged for {id:?}");
    assert_eq!(a.x(), b.x(), "x diverged for {id:?}");
    assert_eq!(a.y(), b.y(), "y diverged for {id:?}");
    assert_eq!(a.width(), b.width(), "width diverged for {id:?}");
    assert_eq!(a.height(), b.height(), "height diverged for {id:?}");
    assert_eq!(a.is_visible(), b.is_visible(), "visibility diverged for {id:?}");
    assert!(a.attrs.observably_equal(&b.attrs), "attrs diverged for {id:?}");
}

#[test]
fn test_initial_snapshot_replicates_whole_tree() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    let label = host.spawn(WidgetKind::Label);
    host.tree_mut()
        .get_mut(label)
        .unwrap()
        .attrs
        .set(AttrKey::Text, AttrValue::Str("HP: 20".into()))
        .unwrap();
    let button = host.spawn(WidgetKind::Button);

    assert!(host.tick() >= 2);
    assert!(sync(&mut host, &mut replica) >= 2);

    assert_mirrored(&host, &replica, label);
    assert_mirrored(&host, &replica, button);
}

#[test]
fn test_incremental_update_travels_alone() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    let label = host.spawn(WidgetKind::Label);
    let frame = host.spawn(WidgetKind::Frame);
    host.tick();
    sync(&mut host, &mut replica);

    // Only the label changes; the frame must not be re-sent.
    host.tree_mut()
        .get_mut(label)
        .unwrap()
        .attrs
        .set(AttrKey::TextColor, AttrValue::Color(Color::new(255, 0, 0, 255)))
        .unwrap();
    assert_eq!(host.tick(), 1);
    assert_eq!(sync(&mut host, &mut replica), 1);

    assert_mirrored(&host, &replica, label);
    assert_mirrored(&host, &replica, frame);
}

#[test]
fn test_attribute_deletion_replicates() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    let label = host.spawn(WidgetKind::Label);
    host.tree_mut()
        .get_mut(label)
        .unwrap()
        .attrs
        .set(AttrKey::Badge, AttrValue::Str("NEW".into()))
        .unwrap();
    host.tick();
    sync(&mut host, &mut replica);
    assert!(replica.tree().get(label).unwrap().attrs.has(AttrKey::Badge));

    host.tree_mut().get_mut(label).unwrap().attrs.clear(AttrKey::Badge);
    host.tick();
    sync(&mut host, &mut replica);
    assert!(!replica.tree().get(label).unwrap().attrs.has(AttrKey::Badge));
    assert_mirrored(&host, &replica, label);
}

#[test]
fn test_layout_result_is_what_replicates() {
    // Three frames with min width 50 in a 240-wide row share it evenly.
    let config = VantageConfig {
        canvas_width: 240,
        canvas_height: 240,
        ..VantageConfig::default()
    };
    let mut host = HostSession::new(config.clone());
    let mut replica = HostSession::new(config);
    let root = host.root();
    host.tree_mut().set_layout_mode(root, LayoutMode::Horizontal);

    let frames: Vec<WidgetId> = (0..3)
        .map(|_| {
            let id = host.spawn(WidgetKind::Frame);
            host.tree_mut().set_min_width(id, 50);
            id
        })
        .collect();

    host.tick();
    sync(&mut host, &mut replica);

    for &id in &frames {
        assert_eq!(host.tree().get(id).unwrap().width(), 80);
        assert_mirrored(&host, &replica, id);
    }
}

#[test]
fn test_settled_session_goes_quiet() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    host.spawn(WidgetKind::Button);
    host.tick();
    sync(&mut host, &mut replica);

    for _ in 0..5 {
        assert_eq!(host.tick(), 0, "settled host must not re-send");
    }
    assert_eq!(host.pending_packets(), 0);
}

#[test]
fn test_replica_survives_kind_change() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    let id = host.spawn(WidgetKind::Label);
    host.tick();
    sync(&mut host, &mut replica);
    assert_eq!(replica.tree().get(id).unwrap().kind(), WidgetKind::Label);

    // The host recycles the slot for a different widget kind.
    host.tree_mut().remove(id);
    let mut replacement = Widget::new(WidgetKind::Button);
    replacement
        .attrs
        .set(AttrKey::Text, AttrValue::Str("OK".into()))
        .unwrap();
    host.tree_mut().insert_remote(id, replacement);
    let root = host.root();
    host.tree_mut().attach(id, root, None).unwrap();
    host.tick();
    sync(&mut host, &mut replica);

    assert_eq!(replica.tree().get(id).unwrap().kind(), WidgetKind::Button);
    assert_mirrored(&host, &replica, id);
}

#[test]
fn test_corrupt_packet_reports_error() {
    let mut host = HostSession::default();
    let mut replica = HostSession::default();

    host.spawn(WidgetKind::Label);
    host.tick();
    let mut packets = host.drain_outbox();
    let packet = packets.pop().unwrap();

    // Truncating mid-record must surface an error, not a partial widget.
    assert!(replica.apply_remote(&packet[..packet.len() - 1]).is_err());
}
