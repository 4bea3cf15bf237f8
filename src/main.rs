//! FamCast Server — parent-child video remote control
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use famcast_core::config::AppConfig;
use famcast_core::error::AppError;
use famcast_relay::engine::RelayEngine;
use famcast_service::catalog::library::VideoLibrary;
use famcast_service::identity::registry::DeviceRegistry;
use famcast_service::seed::SeedData;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("FAMCAST_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FamCast v{}", env!("CARGO_PKG_VERSION"));

    // In-process collaborators; a production deployment would inject
    // durable implementations of the same traits here.
    let registry = Arc::new(DeviceRegistry::new());
    let library = Arc::new(VideoLibrary::new());

    if let Some(seed_file) = &config.service.seed_file {
        let seed = SeedData::load(seed_file)?;
        seed.apply(&registry, &library)?;
        tracing::info!(seed_file = %seed_file, "Loaded development seed");
    }

    let engine = Arc::new(RelayEngine::new(
        config.relay.clone(),
        registry.clone(),
        library.clone(),
    ));

    famcast_api::run_server(config, engine).await
}
