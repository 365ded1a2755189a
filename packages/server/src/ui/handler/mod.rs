//! Route handlers.

mod http;
mod websocket;

pub use http::{get_room, health_check, lock_room, unlock_room};
pub use websocket::websocket_handler;
