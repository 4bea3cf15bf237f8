//! In-process collaborator configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-process device registry and video library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Optional TOML seed file with devices and videos for development.
    #[serde(default)]
    pub seed_file: Option<String>,
}
