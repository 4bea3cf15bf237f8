//! Logical pairing channels between a parent and its child.

pub mod pairing;

pub use pairing::{ChannelKey, PairingChannels};
