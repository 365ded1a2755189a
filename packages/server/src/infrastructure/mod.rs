//! Infrastructure layer: transports implementing the connection contract and
//! the wire/HTTP data transfer objects.

pub mod connection;
pub mod dto;
