//! Presence directory — the single source of truth for who is reachable.
//!
//! Presence IS key existence: a user is online exactly when the directory
//! holds an entry for them. There is no separate connected flag to drift
//! out of sync with transport state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use famcast_core::types::id::UserId;
use famcast_core::types::role::DeviceRole;

use super::handle::ConnectionHandle;

/// Serializable snapshot of one directory entry, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// User id.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Device role.
    pub role: DeviceRole,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
}

/// Process-wide registry mapping user id to live connection handle.
///
/// At most one entry per user id. Operations on the same key are
/// linearized by the underlying map; operations on different keys never
/// block each other.
#[derive(Debug, Default)]
pub struct PresenceDirectory {
    /// User ID → live connection handle.
    by_user: DashMap<UserId, Arc<ConnectionHandle>>,
    /// User ID → last disconnect time. In-memory only.
    last_seen: DashMap<UserId, DateTime<Utc>>,
}

impl PresenceDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
            last_seen: DashMap::new(),
        }
    }

    /// Insert or replace the entry for the handle's user.
    ///
    /// Replacement is silent and last-connection-wins: the superseded
    /// handle is marked dead and never addressed again.
    pub fn put(&self, handle: Arc<ConnectionHandle>) {
        let user_id = handle.user_id();
        if let Some(old) = self.by_user.insert(user_id, handle) {
            old.mark_dead();
            tracing::debug!(user_id = %user_id, "Replaced existing connection for user");
        }
    }

    /// Look up the live connection for a user.
    pub fn get(&self, user_id: &UserId) -> Option<Arc<ConnectionHandle>> {
        self.by_user.get(user_id).map(|entry| entry.value().clone())
    }

    /// Whether a user currently has a live connection.
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Evict the entry for this handle's user, but only if the directory
    /// still points at this very connection.
    ///
    /// A disconnect racing a reconnect for the same user thus resolves
    /// deterministically: the newer connection's entry survives. Returns
    /// whether an eviction happened, and records the user's last-seen
    /// time when it did.
    pub fn remove_if_current(&self, handle: &Arc<ConnectionHandle>, at: DateTime<Utc>) -> bool {
        let user_id = handle.user_id();
        let removed = self
            .by_user
            .remove_if(&user_id, |_, current| current.id == handle.id)
            .is_some();
        if removed {
            self.last_seen.insert(user_id, at);
        }
        removed
    }

    /// When a user was last seen before going offline, if known.
    pub fn last_seen(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        self.last_seen.get(user_id).map(|entry| *entry.value())
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    /// Snapshot of all entries, for diagnostics.
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.by_user
            .iter()
            .map(|entry| {
                let handle = entry.value();
                let identity = handle.identity();
                PresenceEntry {
                    user_id: identity.user_id,
                    name: identity.display_name,
                    role: identity.role,
                    connected_at: handle.connected_at,
                }
            })
            .collect()
    }

    /// All live handles. Used at shutdown.
    pub fn all_handles(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famcast_core::types::identity::VerifiedIdentity;
    use tokio::sync::mpsc;

    fn handle_for(user_id: UserId) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(ConnectionHandle::new(
            VerifiedIdentity {
                user_id,
                role: DeviceRole::Parent,
                partner_id: None,
                display_name: "test".to_string(),
            },
            tx,
        ))
    }

    #[tokio::test]
    async fn test_one_entry_per_user_last_connection_wins() {
        let directory = PresenceDirectory::new();
        let user_id = UserId::new();

        let first = handle_for(user_id);
        let second = handle_for(user_id);

        directory.put(first.clone());
        directory.put(second.clone());

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(&user_id).unwrap().id, second.id);
        assert!(!first.is_alive());
        assert!(second.is_alive());
    }

    #[tokio::test]
    async fn test_stale_disconnect_does_not_evict_newer_connection() {
        let directory = PresenceDirectory::new();
        let user_id = UserId::new();

        let old = handle_for(user_id);
        let new = handle_for(user_id);

        directory.put(old.clone());
        directory.put(new.clone());

        // The old connection's teardown arrives after the reconnect.
        assert!(!directory.remove_if_current(&old, Utc::now()));
        assert!(directory.contains(&user_id));

        assert!(directory.remove_if_current(&new, Utc::now()));
        assert!(!directory.contains(&user_id));
        assert!(directory.last_seen(&user_id).is_some());
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let directory = PresenceDirectory::new();
        let handle = handle_for(UserId::new());
        assert!(!directory.remove_if_current(&handle, Utc::now()));
    }
}
