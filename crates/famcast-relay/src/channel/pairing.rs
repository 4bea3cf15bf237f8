//! Pairing channel manager.
//!
//! A channel is not a room of N participants: it is a fixed two-slot
//! pairing keyed by the parent's user id. Membership is recomputed from
//! the current identity on every join, so a device that was re-paired
//! elsewhere self-corrects on its next join.

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use famcast_core::types::id::UserId;
use famcast_core::types::identity::VerifiedIdentity;
use famcast_core::types::role::DeviceRole;

/// Stable logical channel identifier derived from the parent's user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Channel key for the pairing owned by a parent.
    pub fn for_parent(parent_id: UserId) -> Self {
        Self(format!("family:{parent_id}"))
    }

    /// Derive the channel key from an identity.
    ///
    /// `None` for an unpaired identity: the connection is valid but has
    /// no pairing scope, and every pairing-scoped operation treats that
    /// as "nothing to relay", never a fault.
    pub fn derive(identity: &VerifiedIdentity) -> Option<Self> {
        let partner_id = identity.partner_id?;
        match identity.role {
            DeviceRole::Parent => Some(Self::for_parent(identity.user_id)),
            DeviceRole::Child => Some(Self::for_parent(partner_id)),
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two slots of a pairing channel.
#[derive(Debug, Clone, Copy, Default)]
struct PairSlots {
    parent: Option<UserId>,
    child: Option<UserId>,
}

impl PairSlots {
    fn is_empty(&self) -> bool {
        self.parent.is_none() && self.child.is_none()
    }
}

/// Registry of active pairing channels.
///
/// Channels have no lifecycle of their own: one appears when the first
/// party of a pair joins and disappears when the last slot empties.
#[derive(Debug, Default)]
pub struct PairingChannels {
    channels: DashMap<ChannelKey, PairSlots>,
}

impl PairingChannels {
    /// Creates an empty channel registry.
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Join the identity to its derived channel. Idempotent.
    ///
    /// Returns the channel key, or `None` for an unpaired identity.
    pub fn join(&self, identity: &VerifiedIdentity) -> Option<ChannelKey> {
        let key = ChannelKey::derive(identity)?;
        let mut slots = self.channels.entry(key.clone()).or_default();
        match identity.role {
            DeviceRole::Parent => slots.parent = Some(identity.user_id),
            DeviceRole::Child => slots.child = Some(identity.user_id),
        }
        drop(slots);

        tracing::debug!(
            channel = %key,
            user_id = %identity.user_id,
            role = %identity.role,
            "Joined pairing channel"
        );
        Some(key)
    }

    /// Clear the identity's slot in its derived channel.
    ///
    /// Returns the key and whether the channel emptied. The slot is only
    /// cleared if it still holds this user: a slot taken over by a
    /// re-paired device is left alone.
    pub fn leave(&self, identity: &VerifiedIdentity) -> Option<(ChannelKey, bool)> {
        let key = ChannelKey::derive(identity)?;
        let emptied = {
            let mut slots = self.channels.get_mut(&key)?;
            let slot = match identity.role {
                DeviceRole::Parent => &mut slots.parent,
                DeviceRole::Child => &mut slots.child,
            };
            if *slot == Some(identity.user_id) {
                *slot = None;
            }
            slots.is_empty()
        };
        if emptied {
            self.channels.remove_if(&key, |_, slots| slots.is_empty());
        }
        Some((key, emptied))
    }

    /// The current members of a channel: (parent, child).
    pub fn members(&self, key: &ChannelKey) -> (Option<UserId>, Option<UserId>) {
        self.channels
            .get(key)
            .map(|slots| (slots.parent, slots.child))
            .unwrap_or((None, None))
    }

    /// Number of active channels, for diagnostics.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
