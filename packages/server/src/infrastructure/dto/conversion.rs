//! Conversion logic between DTOs and domain types.

use gameroom_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{OutboundMessage, PlayerInfo};
use crate::infrastructure::dto::{http as http_dto, websocket as ws_dto};

// ========================================
// Domain → DTO
// ========================================

impl From<OutboundMessage> for ws_dto::ServerMessage {
    fn from(message: OutboundMessage) -> Self {
        Self {
            content: message.content,
            sender: message.sender.map(|name| name.into_string()),
        }
    }
}

impl From<PlayerInfo> for http_dto::PlayerDto {
    fn from(info: PlayerInfo) -> Self {
        Self {
            name: info.name.into_string(),
            is_host: info.is_host,
            joined_at: timestamp_to_jst_rfc3339(info.joined_at.value()),
        }
    }
}
