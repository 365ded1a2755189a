//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::http::{PlayerDto, RoomDetailDto},
    ui::state::AppState,
};
use gameroom_shared::time::timestamp_to_jst_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current roster of the room
pub async fn get_room(State(state): State<Arc<AppState>>) -> Json<RoomDetailDto> {
    let room = &state.room;
    let players = room.players().await;
    let locked = room.is_locked().await;

    // Domain Model から DTO への変換
    let host = players
        .iter()
        .find(|p| p.is_host)
        .map(|p| p.name.as_str().to_string());
    Json(RoomDetailDto {
        id: room.id().to_string(),
        locked,
        host,
        players: players.into_iter().map(PlayerDto::from).collect(),
        created_at: timestamp_to_jst_rfc3339(room.created_at().value()),
    })
}

/// Reject further joins
pub async fn lock_room(State(state): State<Arc<AppState>>) -> StatusCode {
    state.room.set_locked(true).await;
    StatusCode::NO_CONTENT
}

pub async fn unlock_room(State(state): State<Arc<AppState>>) -> StatusCode {
    state.room.set_locked(false).await;
    StatusCode::NO_CONTENT
}
