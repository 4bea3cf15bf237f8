//! Directional control/status relay between channel members.

pub mod control;
pub mod state;

pub use control::ControlRelay;
pub use state::{ChannelPlayback, PlaybackPhase};
