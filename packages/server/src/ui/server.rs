//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::room::Room;

use super::{
    handler::{get_room, health_check, lock_room, unlock_room, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket game room server
///
/// # Example
///
/// ```ignore
/// let room = Room::new(RoomConfig::default())?;
/// let channels = room.start().await?;
/// tokio::spawn(Relay::new(room.clone()).run(channels));
/// Server::new(room).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    room: Arc<Room>,
}

impl Server {
    pub fn new(room: Arc<Room>) -> Self {
        Self { room }
    }

    /// Routes of the server, without binding.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            room: self.room.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/room", get(get_room))
            .route("/api/room/lock", post(lock_room))
            .route("/api/room/unlock", post(unlock_room))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server until Ctrl+C or SIGTERM, then stop the room.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Game room server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?name=<name>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        // WebSocket connections are not tracked by graceful shutdown
        self.room.stop().await;
        served?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
