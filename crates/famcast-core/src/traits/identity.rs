//! Identity resolution trait for the external identity collaborator.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;
use crate::types::identity::VerifiedIdentity;
use crate::types::role::DeviceRole;

/// The durable identity record a credential resolves to.
///
/// This is the authoritative source of role and partner: whatever the
/// client self-declares at connect time is advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// The user the credential belongs to.
    pub user_id: UserId,
    /// Which side of a pairing this device is.
    pub role: DeviceRole,
    /// The durable paired partner, if pairing has completed.
    pub partner_id: Option<UserId>,
    /// Human-readable display name.
    pub display_name: String,
}

impl From<IdentityRecord> for VerifiedIdentity {
    fn from(record: IdentityRecord) -> Self {
        Self {
            user_id: record.user_id,
            role: record.role,
            partner_id: record.partner_id,
            display_name: record.display_name,
        }
    }
}

/// Trait for resolving opaque bearer credentials to identity records.
///
/// Implementations own credential storage and pairing durability; the
/// relay only consumes the resolved records.
#[async_trait]
pub trait IdentityResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a credential to a known, active identity.
    ///
    /// Fails with an authentication error when the credential cannot be
    /// resolved.
    async fn resolve(&self, credential: &str) -> AppResult<IdentityRecord>;

    /// Re-fetch the durable record for an already-authenticated user.
    ///
    /// Used when pairing completes mid-connection: the partner link may
    /// have changed since the connection was admitted.
    async fn refresh(&self, user_id: UserId) -> AppResult<IdentityRecord>;
}
