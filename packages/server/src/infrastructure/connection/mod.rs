//! Connection implementations.
//!
//! - `websocket`: axum WebSocket
//! - `memory`: tokio channels, for tests and embedding

pub mod memory;
pub mod websocket;

pub use memory::{MemoryConnection, MemoryPeer, memory_pair};
pub use websocket::WebSocketConnection;
