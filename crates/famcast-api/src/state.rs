//! Application state shared across all handlers.

use std::sync::Arc;

use famcast_core::config::AppConfig;
use famcast_relay::engine::RelayEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Relay engine.
    pub engine: Arc<RelayEngine>,
}

impl AppState {
    /// Creates the application state.
    pub fn new(config: Arc<AppConfig>, engine: Arc<RelayEngine>) -> Self {
        Self { config, engine }
    }
}
