//! Verified identity attached to a live connection.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::role::DeviceRole;

/// Identity produced by the identity gate for one connection attempt.
///
/// Role and partner always come from the durable identity record the
/// credential resolves to; client-declared hints never override them.
/// A connection's identity is only ever replaced wholesale by a fresh
/// gate resolution (pairing completion, re-authentication), never
/// mutated field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// The authenticated user.
    pub user_id: UserId,
    /// Which side of a pairing this device is.
    pub role: DeviceRole,
    /// The durable paired partner, if pairing has completed.
    pub partner_id: Option<UserId>,
    /// Human-readable name shown to the partner.
    pub display_name: String,
}

impl VerifiedIdentity {
    /// Whether this identity belongs to a completed pairing.
    pub fn is_paired(&self) -> bool {
        self.partner_id.is_some()
    }
}
