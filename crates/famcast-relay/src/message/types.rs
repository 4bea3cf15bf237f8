//! Inbound and outbound WebSocket message type definitions.
//!
//! Event names are snake_case under a `type` tag; field names are
//! camelCase on the wire. Payload shapes are closed: anything that does
//! not decode into [`ClientMessage`] is rejected at the boundary and
//! never reaches the relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use famcast_core::types::id::{UserId, VideoId};
use famcast_core::types::identity::VerifiedIdentity;
use famcast_core::types::role::DeviceRole;
use famcast_core::types::video::VideoDescriptor;

/// Outcome reported by the child for an executed control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// The command was executed.
    Success,
    /// The command failed on the child device.
    Error,
}

/// Playback action carried by a forwarded control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// Start or resume playback.
    Play,
    /// Pause playback.
    Pause,
    /// Jump to a position.
    Seek,
    /// Change volume.
    Volume,
    /// Stop playback and clear the active video.
    Stop,
}

impl ControlAction {
    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Seek => "seek",
            Self::Volume => "volume",
            Self::Stop => "stop",
        }
    }
}

/// Messages sent by a client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Explicit pairing-channel join (idempotent; also done at connect).
    JoinRoom,
    /// App-level presence resync: re-announce this user as online.
    UserOnline,
    /// App-level presence resync: announce this user as offline.
    UserOffline,
    /// Ask whether the paired partner is currently online.
    GetPairedStatus,
    /// Ask for this connection's own info.
    GetConnectionInfo,
    /// Parent: start or resume playback of a video.
    #[serde(rename_all = "camelCase")]
    VideoPlay {
        /// Video to play.
        video_id: VideoId,
        /// Optional starting position in seconds.
        current_time: Option<f64>,
    },
    /// Parent: pause playback.
    #[serde(rename_all = "camelCase")]
    VideoPause {
        /// Video being paused.
        video_id: VideoId,
        /// Position at pause time in seconds.
        current_time: f64,
    },
    /// Parent: jump to a position.
    #[serde(rename_all = "camelCase")]
    VideoSeek {
        /// Video being seeked.
        video_id: VideoId,
        /// Target position in seconds.
        seek_time: f64,
    },
    /// Parent: change playback volume.
    #[serde(rename_all = "camelCase")]
    VideoVolume {
        /// Video whose volume is changed.
        video_id: VideoId,
        /// Volume in the range 0.0–1.0.
        volume: f64,
    },
    /// Parent: stop playback.
    #[serde(rename_all = "camelCase")]
    VideoStop {
        /// Video being stopped.
        video_id: VideoId,
    },
    /// Parent: play the next video in the catalog ordering.
    #[serde(rename_all = "camelCase")]
    VideoNext {
        /// Video currently playing.
        current_video_id: VideoId,
    },
    /// Parent: play the previous video in the catalog ordering.
    #[serde(rename_all = "camelCase")]
    VideoPrevious {
        /// Video currently playing.
        current_video_id: VideoId,
    },
    /// Child: acknowledge an executed control command.
    #[serde(rename_all = "camelCase")]
    VideoControlAck {
        /// Action that was executed.
        action: String,
        /// Video the action applied to.
        video_id: VideoId,
        /// Execution outcome.
        status: AckStatus,
    },
    /// Child: periodic playback state report.
    #[serde(rename_all = "camelCase")]
    PlaybackStatus {
        /// Video currently loaded.
        video_id: VideoId,
        /// Playback position in seconds.
        current_time: f64,
        /// Whether playback is running.
        is_playing: bool,
        /// Current volume in the range 0.0–1.0.
        volume: f64,
    },
    /// Application-level keepalive.
    Ping,
    /// Child: a pairing code was redeemed; identity must be re-resolved.
    #[serde(rename_all = "camelCase")]
    ChildPairedSuccess {
        /// The redeemed pairing code.
        pairing_code: String,
    },
}

/// Messages sent by the server to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The paired parent came online.
    #[serde(rename_all = "camelCase")]
    ParentOnline {
        /// Human-readable notice.
        message: String,
        /// Parent's display name.
        user_name: String,
        /// Parent's user id.
        user_id: UserId,
        /// When the parent connected.
        timestamp: DateTime<Utc>,
    },
    /// The paired parent went offline.
    #[serde(rename_all = "camelCase")]
    ParentOffline {
        /// Human-readable notice.
        message: String,
        /// Parent's display name.
        user_name: String,
        /// Parent's user id.
        user_id: UserId,
        /// When the parent disconnected.
        timestamp: DateTime<Utc>,
    },
    /// The paired child came online.
    #[serde(rename_all = "camelCase")]
    ChildOnline {
        /// Human-readable notice.
        message: String,
        /// Child's display name.
        user_name: String,
        /// Child's user id.
        user_id: UserId,
        /// When the child connected.
        timestamp: DateTime<Utc>,
    },
    /// The paired child went offline.
    #[serde(rename_all = "camelCase")]
    ChildOffline {
        /// Human-readable notice.
        message: String,
        /// Child's display name.
        user_name: String,
        /// Child's user id.
        user_id: UserId,
        /// When the child disconnected.
        timestamp: DateTime<Utc>,
    },
    /// Join/resync confirmation for the requesting connection.
    #[serde(rename_all = "camelCase")]
    PresenceConfirmed {
        /// Human-readable notice.
        message: String,
        /// How many of the pair are currently online.
        paired_devices_online: usize,
        /// Pair size (2 once paired, 1 before).
        total_paired_devices: usize,
    },
    /// Pairing completed; sent to the parent.
    #[serde(rename_all = "camelCase")]
    PairingSuccess {
        /// Human-readable notice.
        message: String,
        /// Newly linked child's display name.
        child_name: String,
        /// Newly linked child's user id.
        child_id: UserId,
        /// The redeemed pairing code.
        pairing_code: String,
        /// When the pairing completed.
        paired_at: DateTime<Utc>,
    },
    /// Playback command relayed to the child.
    #[serde(rename_all = "camelCase")]
    VideoControl {
        /// The playback action.
        action: ControlAction,
        /// Video the action applies to.
        video_id: VideoId,
        /// Position in seconds for play.
        #[serde(skip_serializing_if = "Option::is_none")]
        current_time: Option<f64>,
        /// Position in seconds for seek.
        #[serde(skip_serializing_if = "Option::is_none")]
        seek_time: Option<f64>,
        /// Volume for volume changes.
        #[serde(skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
        /// Descriptor, attached when the command introduces new media.
        #[serde(skip_serializing_if = "Option::is_none")]
        video: Option<VideoDescriptor>,
        /// When the command was relayed.
        timestamp: DateTime<Utc>,
    },
    /// Child acknowledgment relayed to the parent.
    #[serde(rename_all = "camelCase")]
    ChildStatus {
        /// Action the child executed.
        action: String,
        /// Video the action applied to.
        video_id: VideoId,
        /// Execution outcome.
        status: AckStatus,
        /// Child's display name.
        child_name: String,
        /// When the acknowledgment was relayed.
        timestamp: DateTime<Utc>,
    },
    /// Child playback report relayed to the parent.
    #[serde(rename_all = "camelCase")]
    ChildPlaybackStatus {
        /// Video currently loaded on the child.
        video_id: VideoId,
        /// Playback position in seconds.
        current_time: f64,
        /// Whether playback is running.
        is_playing: bool,
        /// Current volume.
        volume: f64,
        /// Child's display name.
        child_name: String,
        /// When the report was relayed.
        timestamp: DateTime<Utc>,
    },
    /// Reply to a liveness query.
    #[serde(rename_all = "camelCase")]
    PairedStatus {
        /// Whether the partner is currently online.
        is_online: bool,
        /// When the partner was last seen, if known.
        last_seen_at: Option<DateTime<Utc>>,
    },
    /// Reply to a connection-info query.
    #[serde(rename_all = "camelCase")]
    ConnectionInfo {
        /// Total live connections on this server.
        total_connections: usize,
        /// This connection's role.
        role: DeviceRole,
        /// When this connection was established.
        connected_at: DateTime<Utc>,
    },
    /// Keepalive reply.
    Pong {
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Operation failure surfaced to the sender.
    Error {
        /// Short human-readable description.
        message: String,
    },
}

impl ServerMessage {
    /// Peer-online notification about `peer`, named by the peer's role.
    ///
    /// A parent hears `child_online` about its child and vice versa.
    pub fn peer_online(peer: &VerifiedIdentity, at: DateTime<Utc>) -> Self {
        let message = format!("{} is online", peer.display_name);
        match peer.role {
            DeviceRole::Parent => Self::ParentOnline {
                message,
                user_name: peer.display_name.clone(),
                user_id: peer.user_id,
                timestamp: at,
            },
            DeviceRole::Child => Self::ChildOnline {
                message,
                user_name: peer.display_name.clone(),
                user_id: peer.user_id,
                timestamp: at,
            },
        }
    }

    /// Peer-offline notification about `peer`, named by the peer's role.
    pub fn peer_offline(peer: &VerifiedIdentity, at: DateTime<Utc>) -> Self {
        let message = format!("{} went offline", peer.display_name);
        match peer.role {
            DeviceRole::Parent => Self::ParentOffline {
                message,
                user_name: peer.display_name.clone(),
                user_id: peer.user_id,
                timestamp: at,
            },
            DeviceRole::Child => Self::ChildOffline {
                message,
                user_name: peer.display_name.clone(),
                user_id: peer.user_id,
                timestamp: at,
            },
        }
    }

    /// Error message for the sender of a failed operation.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
