//! Integration tests for the pairing-completion flow: unpaired devices
//! connect, a code is redeemed, and the channel comes alive without
//! either side reconnecting.

mod common;

use common::Harness;
use famcast_relay::message::types::ServerMessage;

#[tokio::test]
async fn test_pairing_completion_links_two_live_connections() {
    let harness = Harness::bare();
    let parent_id = harness.registry.register_parent("Dana", "tok-p");
    let child_id = harness.registry.register_child("Tablet", "tok-c");

    // Both connect while still unpaired: no channel, no announcements.
    let mut parent = harness.connect("tok-p").await;
    let mut child = harness.connect("tok-c").await;
    parent.drain();
    child.drain();
    assert_eq!(harness.engine.channels.channel_count(), 0);

    // The code is redeemed out-of-band (the pairing collaborator)...
    let code = harness.registry.issue_pairing_code(parent_id).unwrap();
    harness.registry.redeem_pairing_code(&code, child_id).unwrap();

    // ...and the child then signals completion over its live connection.
    harness
        .send(
            &child,
            &format!(r#"{{"type":"child_paired_success","pairingCode":"{code}"}}"#),
        )
        .await;

    // Parent hears pairing_success plus the child coming online.
    match parent.recv().await {
        ServerMessage::PairingSuccess {
            child_name,
            child_id: announced_child,
            pairing_code,
            ..
        } => {
            assert_eq!(child_name, "Tablet");
            assert_eq!(announced_child, child_id);
            assert_eq!(pairing_code, code);
        }
        other => panic!("unexpected message: {other:?}"),
    }
    assert!(matches!(
        parent.recv().await,
        ServerMessage::ChildOnline { .. }
    ));

    // Child hears the parent is online.
    assert!(matches!(
        child.recv().await,
        ServerMessage::ParentOnline { .. }
    ));

    // The channel now exists and relays commands end to end.
    assert_eq!(harness.engine.channels.channel_count(), 1);

    harness.library.add_video(
        parent_id,
        famcast_core::types::id::VideoId::new("v1"),
        famcast_core::types::video::VideoDescriptor {
            title: "First".to_string(),
            playable_url: "https://videos.test/v1.mp4".to_string(),
            duration_seconds: 60.0,
        },
    );

    // The parent's live connection was refreshed as part of the pairing
    // signal; commands flow without a reconnect.
    harness
        .send(&parent, r#"{"type":"video_play","videoId":"v1"}"#)
        .await;
    assert!(matches!(
        child.recv().await,
        ServerMessage::VideoControl { .. }
    ));
}

#[tokio::test]
async fn test_pairing_signal_without_completed_pairing_is_rejected() {
    let harness = Harness::bare();
    harness.registry.register_child("Tablet", "tok-c");

    let mut child = harness.connect("tok-c").await;
    child.drain();

    // No code was redeemed; the durable record is still unpaired.
    harness
        .send(
            &child,
            r#"{"type":"child_paired_success","pairingCode":"000000"}"#,
        )
        .await;
    assert!(matches!(child.recv().await, ServerMessage::Error { .. }));
}

#[tokio::test]
async fn test_parent_cannot_send_pairing_signal() {
    let harness = Harness::bare();
    harness.registry.register_parent("Dana", "tok-p");

    let mut parent = harness.connect("tok-p").await;
    parent.drain();

    harness
        .send(
            &parent,
            r#"{"type":"child_paired_success","pairingCode":"123456"}"#,
        )
        .await;
    assert!(matches!(parent.recv().await, ServerMessage::Error { .. }));
}
