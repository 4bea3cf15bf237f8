//! Shared harness for integration tests: a relay engine over in-memory
//! collaborators, driven directly through `register`/`handle_inbound`.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use famcast_core::types::id::{UserId, VideoId};
use famcast_core::types::video::VideoDescriptor;
use famcast_relay::connection::handle::ConnectionHandle;
use famcast_relay::engine::RelayEngine;
use famcast_relay::message::types::ServerMessage;
use famcast_service::catalog::library::VideoLibrary;
use famcast_service::identity::registry::DeviceRegistry;

/// A connected test client.
pub struct TestClient {
    pub handle: Arc<ConnectionHandle>,
    pub rx: mpsc::Receiver<ServerMessage>,
}

impl TestClient {
    /// Next queued message, or panic after a second.
    pub async fn recv(&mut self) -> ServerMessage {
        tokio::time::timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .expect("timed out waiting for message")
            .expect("connection channel closed")
    }

    /// Assert nothing is queued.
    pub fn assert_silent(&mut self) {
        match self.rx.try_recv() {
            Err(mpsc::error::TryRecvError::Empty) => {}
            other => panic!("expected no message, got {other:?}"),
        }
    }

    /// Discard everything currently queued.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Engine plus collaborators, preloaded with one family and a playlist.
pub struct Harness {
    pub registry: Arc<DeviceRegistry>,
    pub library: Arc<VideoLibrary>,
    pub engine: Arc<RelayEngine>,
}

pub const PARENT_TOKEN: &str = "tok-parent";
pub const CHILD_TOKEN: &str = "tok-child";

impl Harness {
    /// Empty engine with no devices registered.
    pub fn bare() -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        let library = Arc::new(VideoLibrary::new());
        let engine = Arc::new(RelayEngine::new(
            Default::default(),
            registry.clone(),
            library.clone(),
        ));
        Self {
            registry,
            library,
            engine,
        }
    }

    /// Engine with a paired family ("Dana" + "Tablet") and videos
    /// v1..v3 in Dana's playlist.
    pub fn with_family() -> (Self, UserId, UserId) {
        let harness = Self::bare();
        let parent_id = harness.registry.register_parent("Dana", PARENT_TOKEN);
        let child_id = harness.registry.register_child("Tablet", CHILD_TOKEN);
        harness
            .registry
            .link(parent_id, child_id)
            .expect("link family");

        for id in ["v1", "v2", "v3"] {
            harness.library.add_video(
                parent_id,
                VideoId::new(id),
                VideoDescriptor {
                    title: format!("Title {id}"),
                    playable_url: format!("https://videos.test/{id}.mp4"),
                    duration_seconds: 300.0,
                },
            );
        }

        (harness, parent_id, child_id)
    }

    /// Authenticate a token through the gate and register the connection.
    pub async fn connect(&self, token: &str) -> TestClient {
        let identity = self
            .engine
            .gate
            .verify(Some(token))
            .await
            .expect("credential should resolve");
        let (handle, rx) = self.engine.connections.register(identity);
        TestClient { handle, rx }
    }

    /// Feed one raw frame into the relay as this client.
    pub async fn send(&self, client: &TestClient, raw: &str) {
        self.engine.connections.handle_inbound(&client.handle, raw).await;
    }

    /// Close a client's connection.
    pub fn disconnect(&self, client: &TestClient) {
        self.engine.connections.unregister(&client.handle);
    }

    /// Wait for the spawned play-count increment to land.
    pub async fn wait_for_play_count(&self, video_id: &str, expected: u64) {
        let video_id = VideoId::new(video_id);
        for _ in 0..100 {
            if self.library.play_count(&video_id) == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "play count for {video_id} never reached {expected} (now {:?})",
            self.library.play_count(&video_id)
        );
    }
}
