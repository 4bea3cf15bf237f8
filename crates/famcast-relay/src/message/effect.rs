//! Outbound effect unit.
//!
//! Components never talk to transport objects directly; they return
//! effects, and a single dispatcher in the connection manager applies
//! them against the presence directory. This keeps the relay state
//! machine testable without a live transport.

use famcast_core::types::id::UserId;

use super::types::ServerMessage;

/// One message destined for one user's live connection.
#[derive(Debug, Clone)]
pub struct Effect {
    /// Recipient user.
    pub to: UserId,
    /// Message to deliver.
    pub message: ServerMessage,
}

impl Effect {
    /// Create an effect.
    pub fn new(to: UserId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}
