//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{Admission, JoinError, PlayerName},
    infrastructure::connection::WebSocketConnection,
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    pub name: String,
}

/// `GET /ws?name=<name>`
///
/// Membership is checked before the upgrade so that a rejected player gets a
/// plain HTTP status. The admission is repeated after the upgrade; a join that
/// loses a race there just closes the socket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<JoinQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> PlayerName (Domain Model)
    let name = match PlayerName::try_from(query.name) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Rejecting connection with invalid name: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if let Err(e) = state.room.check_admission(&name).await {
        tracing::warn!("Rejecting '{}': {}", name, e);
        return Err(join_error_status(&e));
    }

    let config = state.room.config();
    let max_message_size = config.max_message_size;
    let mailbox_capacity = config.mailbox_capacity;
    Ok(ws
        .max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, name, mailbox_capacity)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    name: PlayerName,
    mailbox_capacity: usize,
) {
    let admission = Admission::new(WebSocketConnection::new(socket), name, mailbox_capacity);
    let name = admission.player().name().clone();
    match state.room.join(admission).await {
        Ok(_) => tracing::debug!("'{}' upgraded and joined", name),
        // the socket was dropped together with the admission
        Err(e) => tracing::warn!("'{}' could not join after upgrade: {}", name, e),
    }
}

/// HTTP status for a rejected join
fn join_error_status(error: &JoinError) -> StatusCode {
    match error {
        JoinError::DuplicateName(_) => StatusCode::CONFLICT,
        JoinError::RoomLocked => StatusCode::LOCKED,
        JoinError::RoomFull(_) | JoinError::NotStarted | JoinError::Stopped => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
