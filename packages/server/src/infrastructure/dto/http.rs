//! HTTP API response DTOs.

use serde::Serialize;

/// Player entry of [`RoomDetailDto`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerDto {
    pub name: String,
    pub is_host: bool,
    /// RFC 3339 (JST)
    pub joined_at: String,
}

/// Current state of the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub locked: bool,
    pub host: Option<String>,
    /// In join order
    pub players: Vec<PlayerDto>,
    /// RFC 3339 (JST)
    pub created_at: String,
}
