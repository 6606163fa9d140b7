//! Bridge binary for Feedline.
//!
//! Follows Redis streams and pushes new entries to `WebSocket` clients.
//! Each connection names a stream and a cursor; the bridge polls the
//! stream on a fixed tick and writes every new batch as a JSON text frame.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Connect the Redis pool
//! 4. Build shared server state
//! 5. Serve until `Ctrl-C`

mod config;
mod error;

use std::sync::Arc;

use feedline_server::{AppState, start_server};
use feedline_store::RedisStreams;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::BridgeConfig;
use crate::error::BridgeError;

/// Application entry point for the bridge.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the store is
/// unreachable, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("feedline starting");

    run().await.map_err(|e| {
        tracing::error!(error = %e, "feedline exited with error");
        Box::new(e) as Box<dyn std::error::Error>
    })
}

async fn run() -> Result<(), BridgeError> {
    // 2. Load configuration.
    let config = BridgeConfig::from_env()?;
    config.session.validate()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        poll_period = ?config.session.poll_period,
        write_wait = ?config.session.write_wait,
        read_count = ?config.session.read_count,
        default_stream = config.session.default_stream,
        "Configuration loaded"
    );

    // 3. Connect the Redis pool.
    let store = RedisStreams::connect(&config.redis).await?;

    // 4. Build shared server state.
    let state = AppState::new(Arc::new(store), config.session)?.with_test_stream(config.test_stream);

    // 5. Serve until Ctrl-C.
    start_server(&config.server, Arc::new(state)).await?;

    info!("feedline stopped");
    Ok(())
}
