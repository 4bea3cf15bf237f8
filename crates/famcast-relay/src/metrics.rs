//! Relay engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total connections ever established.
    connections_total: AtomicU64,
    /// Currently active connections.
    connections_active: AtomicU64,
    /// Total inbound messages received.
    messages_received: AtomicU64,
    /// Total messages handed to a recipient's transport.
    messages_relayed: AtomicU64,
    /// Messages dropped because the recipient was absent or stale.
    delivery_misses: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection.
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record an inbound message.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delivered message.
    pub fn message_relayed(&self) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped delivery.
    pub fn delivery_miss(&self) {
        self.delivery_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            delivery_misses: self.delivery_misses.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Total connections ever established.
    pub connections_total: u64,
    /// Currently active connections.
    pub connections_active: u64,
    /// Total inbound messages received.
    pub messages_received: u64,
    /// Total messages handed to a recipient's transport.
    pub messages_relayed: u64,
    /// Messages dropped because the recipient was absent or stale.
    pub delivery_misses: u64,
}
