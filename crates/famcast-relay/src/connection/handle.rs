//! Individual WebSocket connection handle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use famcast_core::types::id::UserId;
use famcast_core::types::identity::VerifiedIdentity;

use crate::message::types::ServerMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live connection.
///
/// Holds the sender channel for pushing messages to the client plus the
/// verified identity the connection was admitted with. The identity is
/// only ever replaced wholesale by a fresh gate resolution.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Verified identity for this connection.
    identity: RwLock<VerifiedIdentity>,
    /// Sender for outbound messages.
    sender: mpsc::Sender<ServerMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last pong or application-level ping received.
    last_pong: RwLock<DateTime<Utc>>,
    /// Whether the connection is still addressable.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(identity: VerifiedIdentity, sender: mpsc::Sender<ServerMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            identity: RwLock::new(identity),
            sender,
            connected_at: now,
            last_pong: RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Snapshot of the connection's current identity.
    pub fn identity(&self) -> VerifiedIdentity {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The user this connection belongs to.
    pub fn user_id(&self) -> UserId {
        self.identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .user_id
    }

    /// Replace the identity after a fresh gate resolution.
    pub fn replace_identity(&self, identity: VerifiedIdentity) {
        let mut guard = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = identity;
    }

    /// Push an outbound message to this connection.
    ///
    /// Non-blocking: a full buffer drops the message, a closed channel
    /// marks the handle dead. Returns whether the message was accepted.
    pub fn send(&self, msg: ServerMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead; it is never addressed again.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Record a pong (or app-level ping) response.
    pub fn record_pong(&self) {
        let mut guard = self
            .last_pong
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Utc::now();
    }

    /// When the last pong was received.
    pub fn last_pong(&self) -> DateTime<Utc> {
        *self
            .last_pong
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
