//! # famcast-service
//!
//! In-process reference implementations of the relay's external
//! collaborators: the device registry (credential resolution and
//! pairing-code redemption) and the video library (catalog ordering,
//! descriptors, play counters).
//!
//! Both are purely in-memory; a production deployment would put durable
//! implementations of the same `famcast-core` traits behind them.

pub mod catalog;
pub mod identity;
pub mod seed;

pub use catalog::library::VideoLibrary;
pub use identity::registry::DeviceRegistry;
pub use seed::SeedData;
