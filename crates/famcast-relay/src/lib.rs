//! # famcast-relay
//!
//! Pairing & presence-aware event relay for FamCast. Provides:
//!
//! - Presence directory mapping authenticated users to live connections
//! - Two-slot pairing channels derived from the parent's identity
//! - Directional relay of playback commands, acknowledgments, and status
//! - Mutual liveness notifications across connects and disconnects
//! - Connection lifecycle management with heartbeat watchdog
//!
//! All state is in-memory and rebuilt from reconnects after a restart.

pub mod channel;
pub mod connection;
pub mod engine;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod relay;

pub use channel::pairing::{ChannelKey, PairingChannels};
pub use connection::directory::PresenceDirectory;
pub use connection::gate::IdentityGate;
pub use connection::handle::ConnectionHandle;
pub use connection::manager::ConnectionManager;
pub use engine::RelayEngine;
pub use metrics::RelayMetrics;
pub use presence::announcer::PresenceAnnouncer;
pub use relay::control::ControlRelay;
