//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Message received from a player.
///
/// Has no sender field: the sender is attached by the server after decoding,
/// and a `sender` key supplied by the peer is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    pub content: String,
}

/// Message sent to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}
