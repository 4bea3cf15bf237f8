//! Connection lifecycle manager and effect dispatcher.
//!
//! Owns the open/close sequences (directory insert happens-before
//! channel join) and routes decoded inbound messages to the announcer
//! and control relay. It is the only component that touches transport
//! handles: everything else returns effects, applied here against the
//! presence directory.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use famcast_core::config::relay::RelayConfig;
use famcast_core::error::AppError;
use famcast_core::result::AppResult;
use famcast_core::traits::catalog::AdjacentDirection;
use famcast_core::types::identity::VerifiedIdentity;
use famcast_core::types::role::DeviceRole;

use crate::channel::pairing::PairingChannels;
use crate::message::effect::Effect;
use crate::message::types::{ClientMessage, ServerMessage};
use crate::message::validator;
use crate::metrics::RelayMetrics;
use crate::presence::announcer::PresenceAnnouncer;
use crate::relay::control::ControlRelay;

use super::directory::PresenceDirectory;
use super::gate::IdentityGate;
use super::handle::ConnectionHandle;

/// Manages connection lifecycles and dispatches relayed messages.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Configuration.
    config: RelayConfig,
    /// Presence directory.
    directory: Arc<PresenceDirectory>,
    /// Pairing channels.
    channels: Arc<PairingChannels>,
    /// Presence announcer.
    announcer: Arc<PresenceAnnouncer>,
    /// Control relay.
    relay: Arc<ControlRelay>,
    /// Identity gate, for mid-connection re-resolution.
    gate: Arc<IdentityGate>,
    /// Metrics.
    metrics: Arc<RelayMetrics>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RelayConfig,
        directory: Arc<PresenceDirectory>,
        channels: Arc<PairingChannels>,
        announcer: Arc<PresenceAnnouncer>,
        relay: Arc<ControlRelay>,
        gate: Arc<IdentityGate>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            config,
            directory,
            channels,
            announcer,
            relay,
            gate,
            metrics,
        }
    }

    /// Registers a verified connection.
    ///
    /// Sequence: directory insert, channel join, connect announcements,
    /// join confirmation to the new connection. Returns the handle and
    /// the receiver draining its outbound messages.
    pub fn register(
        &self,
        identity: VerifiedIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity.clone(), tx));

        self.directory.put(handle.clone());
        self.channels.join(&identity);
        self.metrics.connection_opened();

        let mut effects = self.announcer.on_connect(&identity, handle.connected_at);
        effects.push(self.announcer.presence_confirmed(&identity));
        self.apply(effects);

        tracing::info!(
            conn_id = %handle.id,
            user_id = %identity.user_id,
            role = %identity.role,
            "Connection registered"
        );

        (handle, rx)
    }

    /// Tears down a closed connection.
    ///
    /// A handle superseded by a reconnect is already unaddressed and
    /// must not evict the newer entry or announce anything.
    pub fn unregister(&self, handle: &Arc<ConnectionHandle>) {
        handle.mark_dead();
        self.metrics.connection_closed();

        let now = Utc::now();
        if !self.directory.remove_if_current(handle, now) {
            tracing::debug!(
                conn_id = %handle.id,
                "Connection already superseded, skipping teardown"
            );
            return;
        }

        let identity = handle.identity();
        if let Some((key, emptied)) = self.channels.leave(&identity) {
            if emptied {
                self.relay.forget(&key);
            }
        }

        self.apply(self.announcer.on_disconnect(&identity, now));

        tracing::info!(
            conn_id = %handle.id,
            user_id = %identity.user_id,
            "Connection unregistered"
        );
    }

    /// Processes one raw inbound frame from a client.
    pub async fn handle_inbound(&self, handle: &Arc<ConnectionHandle>, raw: &str) {
        self.metrics.message_received();

        if let Err(e) = validator::validate_frame(raw, self.config.max_message_bytes) {
            self.reply_error(handle, e.message);
            return;
        }

        let msg: ClientMessage = match serde_json::from_str(raw) {
            Ok(m) => m,
            Err(e) => {
                self.reply_error(handle, format!("Invalid message: {e}"));
                return;
            }
        };

        if let Err(e) = validator::validate_fields(&msg) {
            self.reply_error(handle, e.message);
            return;
        }

        match self.dispatch(handle, msg).await {
            Ok(effects) => self.apply(effects),
            Err(e) => self.reply_error(handle, e.message),
        }
    }

    /// Routes a decoded message to the owning component.
    async fn dispatch(
        &self,
        handle: &Arc<ConnectionHandle>,
        msg: ClientMessage,
    ) -> AppResult<Vec<Effect>> {
        let now = Utc::now();
        let identity = handle.identity();

        match msg {
            ClientMessage::JoinRoom => {
                self.channels.join(&identity);
                Ok(vec![self.announcer.presence_confirmed(&identity)])
            }
            ClientMessage::UserOnline => {
                self.channels.join(&identity);
                Ok(self.announcer.on_connect(&identity, now))
            }
            ClientMessage::UserOffline => Ok(self.announcer.on_disconnect(&identity, now)),
            ClientMessage::GetPairedStatus => Ok(vec![self.announcer.paired_status(&identity)]),
            ClientMessage::GetConnectionInfo => Ok(vec![Effect::new(
                identity.user_id,
                ServerMessage::ConnectionInfo {
                    total_connections: self.directory.len(),
                    role: identity.role,
                    connected_at: handle.connected_at,
                },
            )]),
            ClientMessage::Ping => {
                handle.record_pong();
                Ok(vec![Effect::new(
                    identity.user_id,
                    ServerMessage::Pong { timestamp: now },
                )])
            }
            ClientMessage::VideoPlay {
                video_id,
                current_time,
            } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                self.relay.play(&identity, video_id, current_time, now).await
            }
            ClientMessage::VideoPause {
                video_id,
                current_time,
            } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                Ok(self.relay.pause(&identity, video_id, current_time, now))
            }
            ClientMessage::VideoSeek {
                video_id,
                seek_time,
            } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                Ok(self.relay.seek(&identity, video_id, seek_time, now))
            }
            ClientMessage::VideoVolume { video_id, volume } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                Ok(self.relay.volume(&identity, video_id, volume, now))
            }
            ClientMessage::VideoStop { video_id } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                Ok(self.relay.stop(&identity, video_id, now))
            }
            ClientMessage::VideoNext { current_video_id } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                self.relay
                    .step(&identity, current_video_id, AdjacentDirection::Next, now)
                    .await
            }
            ClientMessage::VideoPrevious { current_video_id } => {
                self.require_role(&identity, DeviceRole::Parent)?;
                self.relay
                    .step(&identity, current_video_id, AdjacentDirection::Previous, now)
                    .await
            }
            ClientMessage::VideoControlAck {
                action,
                video_id,
                status,
            } => {
                self.require_role(&identity, DeviceRole::Child)?;
                Ok(self.relay.child_ack(&identity, action, video_id, status, now))
            }
            ClientMessage::PlaybackStatus {
                video_id,
                current_time,
                is_playing,
                volume,
            } => {
                self.require_role(&identity, DeviceRole::Child)?;
                Ok(self.relay.child_playback_status(
                    &identity,
                    video_id,
                    current_time,
                    is_playing,
                    volume,
                    now,
                ))
            }
            ClientMessage::ChildPairedSuccess { pairing_code } => {
                self.require_role(&identity, DeviceRole::Child)?;
                let refreshed = self.gate.refresh(identity.user_id).await?;
                if refreshed.partner_id.is_none() {
                    return Err(AppError::conflict("Pairing has not completed"));
                }
                handle.replace_identity(refreshed.clone());
                self.channels.join(&refreshed);

                // The parent's live connection, if any, also predates the
                // pairing; refresh it so commands flow without a reconnect.
                if let Some(parent_id) = refreshed.partner_id {
                    if let Some(parent_handle) = self.directory.get(&parent_id) {
                        let parent_identity = self.gate.refresh(parent_id).await?;
                        parent_handle.replace_identity(parent_identity.clone());
                        self.channels.join(&parent_identity);
                    }
                }

                Ok(self
                    .announcer
                    .on_pairing_complete(&refreshed, &pairing_code, now))
            }
        }
    }

    /// Applies outbound effects against the directory.
    ///
    /// An absent or stale recipient is the normal "partner offline"
    /// state: the message is dropped silently and only counted.
    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match self.directory.get(&effect.to) {
                Some(handle) => {
                    if handle.send(effect.message) {
                        self.metrics.message_relayed();
                    } else {
                        self.metrics.delivery_miss();
                        tracing::debug!(user_id = %effect.to, "Dropped message to stale connection");
                    }
                }
                None => {
                    self.metrics.delivery_miss();
                    tracing::debug!(user_id = %effect.to, "Recipient offline, dropping message");
                }
            }
        }
    }

    fn require_role(&self, identity: &VerifiedIdentity, role: DeviceRole) -> AppResult<()> {
        if identity.role != role {
            return Err(AppError::authorization(match role {
                DeviceRole::Parent => "Only the parent device can issue playback commands",
                DeviceRole::Child => "Only the child device can send playback reports",
            }));
        }
        Ok(())
    }

    fn reply_error(&self, handle: &ConnectionHandle, message: impl Into<String>) {
        handle.send(ServerMessage::error(message));
    }
}
