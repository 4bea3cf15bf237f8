//! Device identity and pairing-code management.

pub mod registry;

pub use registry::DeviceRegistry;
