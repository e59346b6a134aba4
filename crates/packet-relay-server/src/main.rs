//! Packet relay server.
//!
//! Run with: cargo run -p packet-relay-server
//!
//! Register a session with `POST /uuid` on the API port, then connect
//! WebSocket clients to `ws://localhost:4000/<uuid>`.

mod config;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use packet_relay_core::Relay;
use packet_relay_transport::{ApiState, create_api_router, create_ws_router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();

    let relay = Relay::new(config.echo_policy());
    let api = create_api_router(ApiState::new(relay.clone(), &config.public_ws_url()));
    let ws = create_ws_router(relay);

    if config.shared_port() {
        let addr = config.api_addr();
        tracing::info!("API and WebSocket server running on {addr}");
        serve(addr, api.merge(ws)).await
    } else {
        tracing::info!("API server running on {}", config.api_addr());
        tracing::info!("WebSocket server running on {}", config.ws_addr());
        tokio::try_join!(serve(config.api_addr(), api), serve(config.ws_addr(), ws))?;
        Ok(())
    }
}

async fn serve(addr: std::net::SocketAddr, app: Router) -> anyhow::Result<()> {
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .with_context(|| format!("server on {addr} failed"))
}
