//! Utilities shared by the game room packages.

pub mod logger;
pub mod time;
