//! Domain errors.

use thiserror::Error;

use super::value_object::PlayerName;

/// Rejected player name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("player name must not be empty")]
    Empty,

    #[error("player name must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("player name must not contain control characters")]
    ControlCharacter,
}

/// Membership errors surfaced synchronously to the join caller.
///
/// A rejected player is never admitted and no pumps are started for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("name duplicate: '{0}' is already in the room")]
    DuplicateName(PlayerName),

    #[error("room is locked")]
    RoomLocked,

    #[error("room is full ({0} players)")]
    RoomFull(usize),

    #[error("room has not been started")]
    NotStarted,

    #[error("room has been stopped")]
    Stopped,
}

/// Room lifecycle errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room has already been started")]
    AlreadyStarted,

    #[error("room has been stopped")]
    Stopped,
}

/// Terminal I/O failure of a connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("connection closed")]
    Closed,

    #[error("message of {size} bytes exceeds the limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("deadline expired")]
    DeadlineExpired,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure to enqueue a message into a player's mailbox
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("player '{0}' not found")]
    PlayerNotFound(PlayerName),

    #[error("mailbox of '{0}' is full")]
    MailboxFull(PlayerName),

    #[error("mailbox of '{0}' is closed")]
    MailboxClosed(PlayerName),
}
