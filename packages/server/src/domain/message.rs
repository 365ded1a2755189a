//! Messages flowing through a room.

use std::sync::Arc;

use super::{player::Player, value_object::PlayerName};

/// A message read from a player's connection.
///
/// `sender` is assigned by the inbound pump after decoding; the wire format
/// has no sender field, so a peer cannot impersonate another player.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub content: String,
    pub sender: Arc<Player>,
}

impl InboundMessage {
    pub(crate) fn new(content: String, sender: Arc<Player>) -> Self {
        Self { content, sender }
    }
}

/// A message to be written to a player's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub content: String,
    /// Originating player, `None` for messages produced by the server
    pub sender: Option<PlayerName>,
}

impl OutboundMessage {
    /// Message produced by the server itself
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: None,
        }
    }

    /// Message relayed on behalf of a player
    pub fn from_player(content: impl Into<String>, sender: PlayerName) -> Self {
        Self {
            content: content.into(),
            sender: Some(sender),
        }
    }
}
