//! Integration tests for presence announcements and liveness queries.

mod common;

use common::{CHILD_TOKEN, Harness, PARENT_TOKEN};
use famcast_relay::message::types::ServerMessage;

#[tokio::test]
async fn test_mutual_online_announcements_when_both_connect() {
    // Scenario: parent connects first, child follows.
    let (harness, parent_id, child_id) = Harness::with_family();

    let mut parent = harness.connect(PARENT_TOKEN).await;
    // Child absent: the parent only hears its own join confirmation.
    match parent.recv().await {
        ServerMessage::PresenceConfirmed {
            paired_devices_online,
            total_paired_devices,
            ..
        } => {
            assert_eq!(paired_devices_online, 1);
            assert_eq!(total_paired_devices, 2);
        }
        other => panic!("unexpected message: {other:?}"),
    }
    parent.assert_silent();

    let mut child = harness.connect(CHILD_TOKEN).await;

    // Parent hears exactly one child_online carrying the child's name.
    match parent.recv().await {
        ServerMessage::ChildOnline {
            user_name, user_id, ..
        } => {
            assert_eq!(user_name, "Tablet");
            assert_eq!(user_id, child_id);
        }
        other => panic!("unexpected message: {other:?}"),
    }
    parent.assert_silent();

    // Child hears parent_online, then its own join confirmation.
    match child.recv().await {
        ServerMessage::ParentOnline {
            user_name, user_id, ..
        } => {
            assert_eq!(user_name, "Dana");
            assert_eq!(user_id, parent_id);
        }
        other => panic!("unexpected message: {other:?}"),
    }
    match child.recv().await {
        ServerMessage::PresenceConfirmed {
            paired_devices_online,
            ..
        } => assert_eq!(paired_devices_online, 2),
        other => panic!("unexpected message: {other:?}"),
    }
    child.assert_silent();
}

#[tokio::test]
async fn test_child_disconnect_notifies_parent_exactly_once() {
    // Scenario: child drops mid-session.
    let (harness, _, child_id) = Harness::with_family();

    let mut parent = harness.connect(PARENT_TOKEN).await;
    let child = harness.connect(CHILD_TOKEN).await;
    parent.drain();

    harness.disconnect(&child);

    match parent.recv().await {
        ServerMessage::ChildOffline { user_name, .. } => assert_eq!(user_name, "Tablet"),
        other => panic!("unexpected message: {other:?}"),
    }
    parent.assert_silent();

    // The directory no longer knows the child.
    assert!(!harness.engine.directory.contains(&child_id));

    // A subsequent liveness query reports offline with a last-seen time.
    harness
        .send(&parent, r#"{"type":"get_paired_status"}"#)
        .await;
    match parent.recv().await {
        ServerMessage::PairedStatus {
            is_online,
            last_seen_at,
        } => {
            assert!(!is_online);
            assert!(last_seen_at.is_some());
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_reconnect_keeps_single_directory_entry() {
    // Directory uniqueness: the most recent connect wins.
    let (harness, parent_id, _) = Harness::with_family();

    let first = harness.connect(PARENT_TOKEN).await;
    let second = harness.connect(PARENT_TOKEN).await;

    assert_eq!(harness.engine.directory.len(), 1);
    let current = harness.engine.directory.get(&parent_id).unwrap();
    assert_eq!(current.id, second.handle.id);
    assert!(!first.handle.is_alive());

    // The stale connection's late teardown does not evict the new one.
    harness.disconnect(&first);
    assert!(harness.engine.directory.contains(&parent_id));

    harness.disconnect(&second);
    assert!(!harness.engine.directory.contains(&parent_id));
}

#[tokio::test]
async fn test_unpaired_connect_announces_nothing() {
    let harness = Harness::bare();
    harness.registry.register_parent("Solo", "tok-solo");

    let mut solo = harness.connect("tok-solo").await;
    match solo.recv().await {
        ServerMessage::PresenceConfirmed {
            paired_devices_online,
            total_paired_devices,
            ..
        } => {
            assert_eq!(paired_devices_online, 1);
            assert_eq!(total_paired_devices, 1);
        }
        other => panic!("unexpected message: {other:?}"),
    }
    solo.assert_silent();

    harness.send(&solo, r#"{"type":"get_paired_status"}"#).await;
    match solo.recv().await {
        ServerMessage::PairedStatus {
            is_online,
            last_seen_at,
        } => {
            assert!(!is_online);
            assert!(last_seen_at.is_none());
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_user_online_resync_reannounces() {
    let (harness, _, _) = Harness::with_family();

    let mut parent = harness.connect(PARENT_TOKEN).await;
    let mut child = harness.connect(CHILD_TOKEN).await;
    parent.drain();
    child.drain();

    harness.send(&parent, r#"{"type":"user_online"}"#).await;

    assert!(matches!(
        child.recv().await,
        ServerMessage::ParentOnline { .. }
    ));
    assert!(matches!(
        parent.recv().await,
        ServerMessage::ChildOnline { .. }
    ));
}

#[tokio::test]
async fn test_connection_info_and_ping() {
    let (harness, _, _) = Harness::with_family();

    let mut parent = harness.connect(PARENT_TOKEN).await;
    parent.drain();

    harness
        .send(&parent, r#"{"type":"get_connection_info"}"#)
        .await;
    match parent.recv().await {
        ServerMessage::ConnectionInfo {
            total_connections,
            role,
            ..
        } => {
            assert_eq!(total_connections, 1);
            assert_eq!(role, famcast_core::types::role::DeviceRole::Parent);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    harness.send(&parent, r#"{"type":"ping"}"#).await;
    assert!(matches!(parent.recv().await, ServerMessage::Pong { .. }));
}

#[tokio::test]
async fn test_gate_rejects_missing_and_unknown_credentials() {
    let (harness, _, _) = Harness::with_family();

    let missing = harness.engine.gate.verify(None).await;
    assert!(missing.is_err());

    let unknown = harness.engine.gate.verify(Some("tok-bogus")).await;
    assert!(unknown.is_err());

    // No side effects: nothing was registered.
    assert!(harness.engine.directory.is_empty());
    assert_eq!(harness.engine.channels.channel_count(), 0);
}
