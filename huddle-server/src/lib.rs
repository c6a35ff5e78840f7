mod config;
mod error;
mod http;
mod registry;
mod room;
mod signaling;
mod store;

pub use config::*;
pub use error::*;
pub use http::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;
pub use store::*;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Everything a websocket or HTTP handler needs, shared behind an `Arc`.
pub struct AppState {
    pub config: ServerConfig,
    pub hub: ChannelHub,
    pub relay: SignalingRelay,
    pub rooms: Arc<dyn RoomLookup>,
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    /// State backed by the in-memory message store and room lookup.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(InMemoryRoomLookup::new()),
        )
    }

    pub fn with_collaborators(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        rooms: Arc<dyn RoomLookup>,
    ) -> Self {
        let hub = ChannelHub::new();
        let relay = SignalingRelay::new(
            Arc::new(ConnectionRegistry::new()),
            Arc::new(hub.clone()),
            store.clone(),
            config.history_limit,
        );

        Self {
            config,
            hub,
            relay,
            rooms,
            store,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/rooms/{slug}", post(get_or_create_room))
        .route("/api/rooms/{room_id}/messages", get(list_messages))
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Relay listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server terminated with an error")?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
