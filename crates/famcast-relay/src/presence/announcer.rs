//! Presence announcer — computes partner liveness and produces the
//! directional online/offline notifications.
//!
//! Every method is a pure effect producer: it reads the presence
//! directory and returns the messages to deliver, without touching any
//! transport. The connection manager applies the effects; stale handles
//! are dropped silently there, never retried here.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use famcast_core::types::identity::VerifiedIdentity;

use crate::connection::directory::PresenceDirectory;
use crate::message::effect::Effect;
use crate::message::types::ServerMessage;

/// Produces presence notifications from directory state.
#[derive(Debug)]
pub struct PresenceAnnouncer {
    directory: Arc<PresenceDirectory>,
}

impl PresenceAnnouncer {
    /// Creates a new announcer over the shared directory.
    pub fn new(directory: Arc<PresenceDirectory>) -> Self {
        Self { directory }
    }

    /// Connect-time announcements for `identity`.
    ///
    /// If the partner is present, both sides are told about each other;
    /// if the partner is absent, nobody hears anything.
    pub fn on_connect(&self, identity: &VerifiedIdentity, at: DateTime<Utc>) -> Vec<Effect> {
        let Some(partner_id) = identity.partner_id else {
            return Vec::new();
        };
        let Some(partner_handle) = self.directory.get(&partner_id) else {
            return Vec::new();
        };
        let partner = partner_handle.identity();

        vec![
            Effect::new(partner_id, ServerMessage::peer_online(identity, at)),
            Effect::new(identity.user_id, ServerMessage::peer_online(&partner, at)),
        ]
    }

    /// Disconnect-time announcement about `identity`.
    ///
    /// The departing side is gone and receives nothing; a present
    /// partner is told once.
    pub fn on_disconnect(&self, identity: &VerifiedIdentity, at: DateTime<Utc>) -> Vec<Effect> {
        let Some(partner_id) = identity.partner_id else {
            return Vec::new();
        };
        if !self.directory.contains(&partner_id) {
            return Vec::new();
        }

        vec![Effect::new(
            partner_id,
            ServerMessage::peer_offline(identity, at),
        )]
    }

    /// Synchronous liveness query reply for the requester alone.
    pub fn paired_status(&self, identity: &VerifiedIdentity) -> Effect {
        let (is_online, last_seen_at) = match identity.partner_id {
            Some(partner_id) => match self.directory.get(&partner_id) {
                Some(handle) => (true, Some(handle.connected_at)),
                None => (false, self.directory.last_seen(&partner_id)),
            },
            None => (false, None),
        };

        Effect::new(
            identity.user_id,
            ServerMessage::PairedStatus {
                is_online,
                last_seen_at,
            },
        )
    }

    /// Join/resync confirmation for the requester alone.
    pub fn presence_confirmed(&self, identity: &VerifiedIdentity) -> Effect {
        let total_paired_devices = if identity.is_paired() { 2 } else { 1 };
        let partner_online = identity
            .partner_id
            .map(|partner_id| self.directory.contains(&partner_id))
            .unwrap_or(false);
        let paired_devices_online = 1 + usize::from(partner_online);

        Effect::new(
            identity.user_id,
            ServerMessage::PresenceConfirmed {
                message: "Presence confirmed".to_string(),
                paired_devices_online,
                total_paired_devices,
            },
        )
    }

    /// Pairing-completion announcements.
    ///
    /// Both parties may already hold open connections that were
    /// previously unchanneled, so this mirrors the connect-time event:
    /// `pairing_success` to the parent plus mutual online notices.
    pub fn on_pairing_complete(
        &self,
        child: &VerifiedIdentity,
        pairing_code: &str,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        let Some(parent_id) = child.partner_id else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        if self.directory.contains(&parent_id) {
            effects.push(Effect::new(
                parent_id,
                ServerMessage::PairingSuccess {
                    message: format!("Paired with {}", child.display_name),
                    child_name: child.display_name.clone(),
                    child_id: child.user_id,
                    pairing_code: pairing_code.to_string(),
                    paired_at: at,
                },
            ));
        }
        effects.extend(self.on_connect(child, at));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famcast_core::types::id::UserId;
    use famcast_core::types::role::DeviceRole;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    use crate::connection::handle::ConnectionHandle;

    fn pair() -> (VerifiedIdentity, VerifiedIdentity) {
        let parent_id = UserId::new();
        let child_id = UserId::new();
        (
            VerifiedIdentity {
                user_id: parent_id,
                role: DeviceRole::Parent,
                partner_id: Some(child_id),
                display_name: "Dana".to_string(),
            },
            VerifiedIdentity {
                user_id: child_id,
                role: DeviceRole::Child,
                partner_id: Some(parent_id),
                display_name: "Tablet".to_string(),
            },
        )
    }

    fn connect(directory: &PresenceDirectory, identity: &VerifiedIdentity) -> Arc<ConnectionHandle> {
        let (tx, rx) = mpsc::channel(8);
        // Keep the receiver alive for the test's duration.
        Box::leak(Box::new(rx));
        let handle = Arc::new(ConnectionHandle::new(identity.clone(), tx));
        directory.put(handle.clone());
        handle
    }

    #[tokio::test]
    async fn test_mutual_online_when_partner_present() {
        let directory = Arc::new(PresenceDirectory::new());
        let announcer = PresenceAnnouncer::new(directory.clone());
        let (parent, child) = pair();

        connect(&directory, &child);
        let effects = announcer.on_connect(&parent, Utc::now());

        assert_eq!(effects.len(), 2);
        // The child hears the parent came online.
        match &effects[0].message {
            ServerMessage::ParentOnline { user_name, .. } => {
                assert_eq!(effects[0].to, child.user_id);
                assert_eq!(user_name, "Dana");
            }
            other => panic!("unexpected message: {other:?}"),
        }
        // The parent hears the child is already online.
        match &effects[1].message {
            ServerMessage::ChildOnline { user_name, .. } => {
                assert_eq!(effects[1].to, parent.user_id);
                assert_eq!(user_name, "Tablet");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_announcement_when_partner_absent() {
        let directory = Arc::new(PresenceDirectory::new());
        let announcer = PresenceAnnouncer::new(directory.clone());
        let (parent, _child) = pair();

        assert!(announcer.on_connect(&parent, Utc::now()).is_empty());
        assert!(announcer.on_disconnect(&parent, Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn test_paired_status_reflects_directory() {
        let directory = Arc::new(PresenceDirectory::new());
        let announcer = PresenceAnnouncer::new(directory.clone());
        let (parent, child) = pair();

        let effect = announcer.paired_status(&parent);
        assert_eq!(effect.to, parent.user_id);
        match effect.message {
            ServerMessage::PairedStatus {
                is_online,
                last_seen_at,
            } => {
                assert!(!is_online);
                assert!(last_seen_at.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let child_handle = connect(&directory, &child);
        match announcer.paired_status(&parent).message {
            ServerMessage::PairedStatus { is_online, .. } => assert!(is_online),
            other => panic!("unexpected message: {other:?}"),
        }

        directory.remove_if_current(&child_handle, Utc::now());
        match announcer.paired_status(&parent).message {
            ServerMessage::PairedStatus {
                is_online,
                last_seen_at,
            } => {
                assert!(!is_online);
                assert!(last_seen_at.is_some());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unpaired_identity_queries_offline() {
        let directory = Arc::new(PresenceDirectory::new());
        let announcer = PresenceAnnouncer::new(directory);
        let unpaired = VerifiedIdentity {
            user_id: UserId::new(),
            role: DeviceRole::Child,
            partner_id: None,
            display_name: "Lonely".to_string(),
        };

        match announcer.paired_status(&unpaired).message {
            ServerMessage::PairedStatus { is_online, .. } => assert!(!is_online),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pairing_complete_announces_to_both() {
        let directory = Arc::new(PresenceDirectory::new());
        let announcer = PresenceAnnouncer::new(directory.clone());
        let (parent, child) = pair();

        connect(&directory, &parent);
        connect(&directory, &child);

        let effects = announcer.on_pairing_complete(&child, "482913", Utc::now());
        assert_eq!(effects.len(), 3);
        assert!(matches!(
            effects[0].message,
            ServerMessage::PairingSuccess { .. }
        ));
        assert_eq!(effects[0].to, parent.user_id);
    }
}
