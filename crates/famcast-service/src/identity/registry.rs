//! In-memory device registry with pairing-code redemption.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::RngExt;

use famcast_core::error::AppError;
use famcast_core::result::AppResult;
use famcast_core::traits::identity::{IdentityRecord, IdentityResolver};
use famcast_core::types::id::UserId;
use famcast_core::types::role::DeviceRole;

/// Token-indexed store of device identity records.
///
/// Pairing codes are issued by a parent and redeemed by a child; a
/// successful redemption durably links the two records. The relay then
/// re-resolves the child's record through the identity gate.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    /// Bearer token → user.
    by_token: DashMap<String, UserId>,
    /// User → durable identity record.
    records: DashMap<UserId, IdentityRecord>,
    /// Outstanding pairing code → issuing parent.
    codes: DashMap<String, UserId>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parent device. Returns its user id.
    pub fn register_parent(&self, display_name: impl Into<String>, token: impl Into<String>) -> UserId {
        self.register(display_name, token, DeviceRole::Parent)
    }

    /// Register a child device, initially unpaired. Returns its user id.
    pub fn register_child(&self, display_name: impl Into<String>, token: impl Into<String>) -> UserId {
        self.register(display_name, token, DeviceRole::Child)
    }

    fn register(
        &self,
        display_name: impl Into<String>,
        token: impl Into<String>,
        role: DeviceRole,
    ) -> UserId {
        let user_id = UserId::new();
        self.records.insert(
            user_id,
            IdentityRecord {
                user_id,
                role,
                partner_id: None,
                display_name: display_name.into(),
            },
        );
        self.by_token.insert(token.into(), user_id);
        user_id
    }

    /// Issue a fresh six-digit pairing code for a parent.
    pub fn issue_pairing_code(&self, parent_id: UserId) -> AppResult<String> {
        let record = self
            .records
            .get(&parent_id)
            .ok_or_else(|| AppError::not_found("Unknown parent"))?;
        if !record.role.is_parent() {
            return Err(AppError::validation("Only a parent can issue pairing codes"));
        }
        drop(record);

        let mut rng = rand::rng();
        loop {
            let code = format!("{:06}", rng.random_range(0..1_000_000u32));
            if !self.codes.contains_key(&code) {
                self.codes.insert(code.clone(), parent_id);
                return Ok(code);
            }
        }
    }

    /// Redeem a pairing code on behalf of a child device.
    ///
    /// Links both records durably and consumes the code. Returns the
    /// parent's user id.
    pub fn redeem_pairing_code(&self, code: &str, child_id: UserId) -> AppResult<UserId> {
        let (_, parent_id) = self
            .codes
            .remove(code)
            .ok_or_else(|| AppError::conflict("Unknown or already redeemed pairing code"))?;

        {
            let mut child = self
                .records
                .get_mut(&child_id)
                .ok_or_else(|| AppError::not_found("Unknown child"))?;
            if !child.role.is_child() {
                return Err(AppError::validation("Only a child can redeem pairing codes"));
            }
            child.partner_id = Some(parent_id);
        }
        {
            let mut parent = self
                .records
                .get_mut(&parent_id)
                .ok_or_else(|| AppError::not_found("Unknown parent"))?;
            parent.partner_id = Some(child_id);
        }

        tracing::info!(parent_id = %parent_id, child_id = %child_id, "Pairing completed");
        Ok(parent_id)
    }

    /// Link two devices directly, bypassing the code flow. Used by seeds
    /// and tests.
    pub fn link(&self, parent_id: UserId, child_id: UserId) -> AppResult<()> {
        {
            let mut parent = self
                .records
                .get_mut(&parent_id)
                .ok_or_else(|| AppError::not_found("Unknown parent"))?;
            parent.partner_id = Some(child_id);
        }
        {
            let mut child = self
                .records
                .get_mut(&child_id)
                .ok_or_else(|| AppError::not_found("Unknown child"))?;
            child.partner_id = Some(parent_id);
        }
        Ok(())
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl IdentityResolver for DeviceRegistry {
    async fn resolve(&self, credential: &str) -> AppResult<IdentityRecord> {
        let user_id = self
            .by_token
            .get(credential)
            .map(|entry| *entry.value())
            .ok_or_else(|| AppError::authentication("Invalid credential"))?;
        self.refresh(user_id).await
    }

    async fn refresh(&self, user_id: UserId) -> AppResult<IdentityRecord> {
        self.records
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::authentication("Unknown user"))
    }
}
