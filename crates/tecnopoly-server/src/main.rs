//! Tecnopoly multiplayer game server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod pacing;
mod protocol;
mod room;
mod server;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    info!(
        artefacts = config.board.purchasable_count(),
        step_delay = ?config.pacing.step_delay,
        turn_delay = ?config.pacing.turn_delay,
        "Starting Tecnopoly server..."
    );

    let state = Arc::new(ServerState::new(&config));

    server::run_server(config.addr, state).await
}
