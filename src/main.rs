//! Robot Duel relay server
//!
//! Pairs two browser peers per room over WebSocket and relays their inputs
//! and host snapshots. Also serves the character catalog over HTTP.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use robot_duel::app::AppState;
use robot_duel::config::Config;
use robot_duel::http::build_router;
use robot_duel::util::time::init_server_time;
use robot_duel::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Robot Duel server");
    info!(
        server_addr = %config.server_addr,
        origins = ?config.client_origins,
        input_rate_limit = config.input_rate_limit,
        "Configuration loaded"
    );

    let state = AppState::new(config.clone());
    let router = build_router(state);

    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
