//! Video descriptor supplied by the catalog collaborator.

use serde::{Deserialize, Serialize};

/// Playable video metadata.
///
/// Opaque to the relay: it is resolved by the catalog when a command
/// introduces new media and carried inside the forwarded control message
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    /// Display title.
    pub title: String,
    /// URL the child device can play directly.
    pub playable_url: String,
    /// Duration in seconds.
    pub duration_seconds: f64,
}
