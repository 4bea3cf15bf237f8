//! # famcast-api
//!
//! HTTP/WebSocket surface for FamCast: the `/ws` upgrade endpoint that
//! feeds connections into the relay engine, plus health and diagnostics
//! routes for operational visibility.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use state::AppState;
