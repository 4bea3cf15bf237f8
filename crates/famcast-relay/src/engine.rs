//! Top-level relay engine that ties together all subsystems.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use famcast_core::config::relay::RelayConfig;
use famcast_core::traits::catalog::VideoCatalog;
use famcast_core::traits::identity::IdentityResolver;

use crate::channel::pairing::PairingChannels;
use crate::connection::directory::{PresenceDirectory, PresenceEntry};
use crate::connection::gate::IdentityGate;
use crate::connection::manager::ConnectionManager;
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::presence::announcer::PresenceAnnouncer;
use crate::relay::control::ControlRelay;

/// Operational snapshot of the relay, for the diagnostics surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaySnapshot {
    /// Total live connections.
    pub total_connections: usize,
    /// Active pairing channels.
    pub active_rooms: usize,
    /// Per-connection entries.
    pub connections: Vec<PresenceEntry>,
}

/// Central relay engine coordinating all subsystems.
///
/// Constructed once at process start over the injected collaborators and
/// passed by handle to everything that needs it; there are no module
/// singletons.
#[derive(Clone)]
pub struct RelayEngine {
    /// Presence directory.
    pub directory: Arc<PresenceDirectory>,
    /// Pairing channels.
    pub channels: Arc<PairingChannels>,
    /// Presence announcer.
    pub announcer: Arc<PresenceAnnouncer>,
    /// Control relay.
    pub relay: Arc<ControlRelay>,
    /// Identity gate.
    pub gate: Arc<IdentityGate>,
    /// Connection lifecycle manager.
    pub connections: Arc<ConnectionManager>,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    /// Relay configuration.
    pub config: RelayConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEngine").finish()
    }
}

impl RelayEngine {
    /// Creates a new relay engine with all subsystems.
    pub fn new(
        config: RelayConfig,
        resolver: Arc<dyn IdentityResolver>,
        catalog: Arc<dyn VideoCatalog>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RelayMetrics::new());
        let directory = Arc::new(PresenceDirectory::new());
        let channels = Arc::new(PairingChannels::new());
        let announcer = Arc::new(PresenceAnnouncer::new(directory.clone()));
        let relay = Arc::new(ControlRelay::new(catalog));
        let gate = Arc::new(IdentityGate::new(resolver));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            directory.clone(),
            channels.clone(),
            announcer.clone(),
            relay.clone(),
            gate.clone(),
            metrics.clone(),
        ));

        info!("Relay engine initialized");

        Self {
            directory,
            channels,
            announcer,
            relay,
            gate,
            connections,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Operational snapshot for the diagnostics surface.
    pub fn snapshot(&self) -> RelaySnapshot {
        RelaySnapshot {
            total_connections: self.directory.len(),
            active_rooms: self.channels.channel_count(),
            connections: self.directory.snapshot(),
        }
    }

    /// Current metrics counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the relay engine.
    pub fn shutdown(&self) {
        info!("Shutting down relay engine");

        let _ = self.shutdown_tx.send(());

        for handle in self.directory.all_handles() {
            handle.mark_dead();
        }
    }
}
