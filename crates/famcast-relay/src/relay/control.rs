//! Control relay — forwards parent playback commands to the child slot
//! and child acknowledgments/status reports back to the parent.
//!
//! Authorization and media resolution are delegated to the catalog
//! collaborator; the relay trusts what it gets back. An absent recipient
//! is a normal no-op delivery, resolved at dispatch time, never an error
//! surfaced to the sender.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use famcast_core::error::AppError;
use famcast_core::result::AppResult;
use famcast_core::traits::catalog::{AdjacentDirection, VideoCatalog};
use famcast_core::types::id::{UserId, VideoId};
use famcast_core::types::identity::VerifiedIdentity;

use crate::channel::pairing::ChannelKey;
use crate::message::effect::Effect;
use crate::message::types::{AckStatus, ControlAction, ServerMessage};
use crate::relay::state::ChannelPlayback;

/// Relays control and status messages within a pairing channel.
#[derive(Debug)]
pub struct ControlRelay {
    catalog: Arc<dyn VideoCatalog>,
    /// Channel key → playback state. Forgotten when the channel empties.
    sessions: DashMap<ChannelKey, ChannelPlayback>,
}

impl ControlRelay {
    /// Creates a new control relay over the catalog collaborator.
    pub fn new(catalog: Arc<dyn VideoCatalog>) -> Self {
        Self {
            catalog,
            sessions: DashMap::new(),
        }
    }

    /// Parent command: start or resume playback.
    ///
    /// A `play` naming the paused video resumes it without descriptor or
    /// play-count side effects. A `play` introducing new media is
    /// authorized against the catalog, gets the descriptor attached, and
    /// increments the video's play counter fire-and-forget.
    pub async fn play(
        &self,
        parent: &VerifiedIdentity,
        video_id: VideoId,
        current_time: Option<f64>,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Effect>> {
        let Some((key, child_id)) = Self::scope(parent) else {
            return Ok(Vec::new());
        };

        let mut state = self.session(&key);
        if state.is_resume(&video_id) {
            state.resume();
            self.sessions.insert(key, state);
            return Ok(vec![Effect::new(
                child_id,
                ServerMessage::VideoControl {
                    action: ControlAction::Play,
                    video_id,
                    current_time,
                    seek_time: None,
                    volume: None,
                    video: None,
                    timestamp: at,
                },
            )]);
        }

        if !self.catalog.authorize(parent.user_id, &video_id).await? {
            return Err(AppError::authorization(format!(
                "Not authorized to control video '{video_id}'"
            )));
        }
        let descriptor = self
            .catalog
            .descriptor(&video_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unknown video '{video_id}'")))?;

        state.start(video_id.clone());
        self.sessions.insert(key, state);
        self.spawn_record_play(video_id.clone());

        Ok(vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Play,
                video_id,
                current_time: Some(current_time.unwrap_or(0.0)),
                seek_time: None,
                volume: None,
                video: Some(descriptor),
                timestamp: at,
            },
        )])
    }

    /// Parent command: pause playback.
    pub fn pause(
        &self,
        parent: &VerifiedIdentity,
        video_id: VideoId,
        current_time: f64,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some((key, child_id)) = Self::scope(parent) else {
            return Vec::new();
        };

        let mut state = self.session(&key);
        state.pause();
        self.sessions.insert(key, state);

        vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Pause,
                video_id,
                current_time: Some(current_time),
                seek_time: None,
                volume: None,
                video: None,
                timestamp: at,
            },
        )]
    }

    /// Parent command: jump to a position. Phase unchanged.
    pub fn seek(
        &self,
        parent: &VerifiedIdentity,
        video_id: VideoId,
        seek_time: f64,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some((_, child_id)) = Self::scope(parent) else {
            return Vec::new();
        };

        vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Seek,
                video_id,
                current_time: None,
                seek_time: Some(seek_time),
                volume: None,
                video: None,
                timestamp: at,
            },
        )]
    }

    /// Parent command: change volume. Phase unchanged.
    pub fn volume(
        &self,
        parent: &VerifiedIdentity,
        video_id: VideoId,
        volume: f64,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some((_, child_id)) = Self::scope(parent) else {
            return Vec::new();
        };

        vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Volume,
                video_id,
                current_time: None,
                seek_time: None,
                volume: Some(volume),
                video: None,
                timestamp: at,
            },
        )]
    }

    /// Parent command: stop playback and clear the active video.
    pub fn stop(
        &self,
        parent: &VerifiedIdentity,
        video_id: VideoId,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some((key, child_id)) = Self::scope(parent) else {
            return Vec::new();
        };

        let mut state = self.session(&key);
        state.stop();
        self.sessions.insert(key, state);

        vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Stop,
                video_id,
                current_time: None,
                seek_time: None,
                volume: None,
                video: None,
                timestamp: at,
            },
        )]
    }

    /// Parent command: play the adjacent video in the catalog ordering.
    ///
    /// The ordering is cyclic: `next` at the end wraps to the first
    /// video, `previous` at the start wraps to the last. An empty
    /// catalog makes this a silent no-op.
    pub async fn step(
        &self,
        parent: &VerifiedIdentity,
        current: VideoId,
        direction: AdjacentDirection,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Effect>> {
        let Some((key, child_id)) = Self::scope(parent) else {
            return Ok(Vec::new());
        };

        let Some((video_id, descriptor)) = self
            .catalog
            .adjacent(parent.user_id, &current, direction)
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut state = self.session(&key);
        state.start(video_id.clone());
        self.sessions.insert(key, state);
        self.spawn_record_play(video_id.clone());

        Ok(vec![Effect::new(
            child_id,
            ServerMessage::VideoControl {
                action: ControlAction::Play,
                video_id,
                current_time: Some(0.0),
                seek_time: None,
                volume: None,
                video: Some(descriptor),
                timestamp: at,
            },
        )])
    }

    /// Child → parent: acknowledgment of an executed command.
    /// Forwarded verbatim; never mutates relay state.
    pub fn child_ack(
        &self,
        child: &VerifiedIdentity,
        action: String,
        video_id: VideoId,
        status: AckStatus,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some(parent_id) = child.partner_id else {
            return Vec::new();
        };

        vec![Effect::new(
            parent_id,
            ServerMessage::ChildStatus {
                action,
                video_id,
                status,
                child_name: child.display_name.clone(),
                timestamp: at,
            },
        )]
    }

    /// Child → parent: periodic playback report.
    /// Forwarded verbatim at whatever cadence the child sends; the relay
    /// imposes no rate limiting or coalescing.
    pub fn child_playback_status(
        &self,
        child: &VerifiedIdentity,
        video_id: VideoId,
        current_time: f64,
        is_playing: bool,
        volume: f64,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some(parent_id) = child.partner_id else {
            return Vec::new();
        };

        vec![Effect::new(
            parent_id,
            ServerMessage::ChildPlaybackStatus {
                video_id,
                current_time,
                is_playing,
                volume,
                child_name: child.display_name.clone(),
                timestamp: at,
            },
        )]
    }

    /// Forget the playback state of an emptied channel.
    pub fn forget(&self, key: &ChannelKey) {
        self.sessions.remove(key);
    }

    /// Current playback state of a channel, if tracked.
    pub fn playback(&self, key: &ChannelKey) -> Option<ChannelPlayback> {
        self.sessions.get(key).map(|entry| entry.value().clone())
    }

    /// Pairing scope of a parent command: channel key + child recipient.
    ///
    /// `None` for an unpaired parent; callers relay nothing in that case.
    fn scope(parent: &VerifiedIdentity) -> Option<(ChannelKey, UserId)> {
        let child_id = parent.partner_id?;
        let key = ChannelKey::derive(parent)?;
        Some((key, child_id))
    }

    /// Snapshot the channel's state without holding a map guard across
    /// catalog calls.
    fn session(&self, key: &ChannelKey) -> ChannelPlayback {
        self.sessions
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn spawn_record_play(&self, video_id: VideoId) {
        let catalog = self.catalog.clone();
        tokio::spawn(async move {
            if let Err(e) = catalog.record_play(&video_id).await {
                tracing::warn!(video_id = %video_id, error = %e, "Play count increment failed");
            }
        });
    }
}
