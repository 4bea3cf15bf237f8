//! Connection liveness watchdog.
//!
//! Transport-level keepalive is external to the relay logic: the API
//! layer sends WebSocket ping frames and records pongs on the handle.
//! This watchdog only observes the pong timestamps and marks the
//! connection dead when they stop, which unblocks the transport loop
//! and triggers the normal disconnect sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time;

use famcast_core::config::relay::RelayConfig;

use super::handle::ConnectionHandle;

/// Whether a connection's last pong is older than the allowed timeout.
pub fn pong_expired(last_pong: DateTime<Utc>, now: DateTime<Utc>, timeout: Duration) -> bool {
    (now - last_pong)
        .to_std()
        .map(|elapsed| elapsed > timeout)
        .unwrap_or(false)
}

/// Runs until the connection dies or times out, then returns.
///
/// The caller selects on this alongside the socket loops; when it
/// returns, the connection must be torn down.
pub async fn run_watchdog(handle: Arc<ConnectionHandle>, config: RelayConfig) {
    let mut interval = time::interval(Duration::from_secs(config.ping_interval_seconds));
    let timeout = Duration::from_secs(config.ping_timeout_seconds);

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        if pong_expired(handle.last_pong(), Utc::now(), timeout) {
            tracing::warn!(
                conn_id = %handle.id,
                "Heartbeat timeout, marking connection dead"
            );
            handle.mark_dead();
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Watchdog ended");
}
