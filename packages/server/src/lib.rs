//! Game room server: per-player connection pumps, keepalive and room
//! membership, with an axum WebSocket front end.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod pump;
pub mod relay;
pub mod room;
pub mod ui;

pub use config::RoomConfig;
pub use relay::Relay;
pub use room::{Room, RoomChannels, RoomEvent};
