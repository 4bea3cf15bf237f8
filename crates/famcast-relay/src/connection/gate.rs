//! Identity gate — admits a connection only with a resolvable credential.

use std::sync::Arc;

use famcast_core::error::AppError;
use famcast_core::traits::identity::IdentityResolver;
use famcast_core::types::id::UserId;
use famcast_core::types::identity::VerifiedIdentity;

/// Verifies inbound credentials against the identity collaborator.
///
/// Runs once per connection attempt, before any directory or channel
/// side effect. Client-declared role/partner hints are advisory only;
/// authority always comes from the resolved durable record.
#[derive(Clone)]
pub struct IdentityGate {
    resolver: Arc<dyn IdentityResolver>,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate").finish()
    }
}

impl IdentityGate {
    /// Creates a new identity gate.
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Verify a connection attempt's credential.
    pub async fn verify(&self, credential: Option<&str>) -> Result<VerifiedIdentity, AppError> {
        let credential = credential
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::authentication("Missing credential"))?;

        let record = self.resolver.resolve(credential).await?;
        Ok(VerifiedIdentity::from(record))
    }

    /// Re-resolve an already-admitted user's durable record.
    ///
    /// Used when pairing completes mid-connection; the returned identity
    /// replaces the connection's identity wholesale.
    pub async fn refresh(&self, user_id: UserId) -> Result<VerifiedIdentity, AppError> {
        let record = self.resolver.refresh(user_id).await?;
        Ok(VerifiedIdentity::from(record))
    }
}
