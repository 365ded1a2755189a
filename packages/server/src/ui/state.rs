//! Shared handler state.

use std::sync::Arc;

use crate::room::Room;

/// Shared application state
pub struct AppState {
    /// Room（参加者を受け入れるルーム）
    pub room: Arc<Room>,
}
