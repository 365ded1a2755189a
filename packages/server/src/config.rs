//! Room configuration.

use std::time::Duration;

use thiserror::Error;

/// Maximum size of one inbound application message, in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 2048;
/// Bound on handing one inbound message to the room
pub const DEFAULT_READ_WAIT: Duration = Duration::from_secs(3);
/// Deadline for any single write (ping, message or close)
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(3);
/// Inbound liveness window
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(10);
/// Interval between keepalive pings, must stay below the liveness window
pub const DEFAULT_PING_PERIOD: Duration = Duration::from_secs(5);
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;
pub const DEFAULT_INBOUND_CAPACITY: usize = 256;

/// Invalid room configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("ping period ({ping_period:?}) must be shorter than pong wait ({pong_wait:?})")]
    PingPeriodTooLong {
        ping_period: Duration,
        pong_wait: Duration,
    },
}

/// Limits and deadlines applied to every player of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    pub max_message_size: usize,
    pub read_wait: Duration,
    pub write_wait: Duration,
    pub pong_wait: Duration,
    pub ping_period: Duration,
    /// Outbound mailbox capacity per player
    pub mailbox_capacity: usize,
    /// Capacity of the queue shared by all inbound pumps
    pub inbound_capacity: usize,
    /// `None` means unlimited
    pub max_players: Option<usize>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            read_wait: DEFAULT_READ_WAIT,
            write_wait: DEFAULT_WRITE_WAIT,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: DEFAULT_PING_PERIOD,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
            max_players: None,
        }
    }
}

impl RoomConfig {
    /// Check that the configuration can drive the pumps.
    ///
    /// Pings must be sent strictly more often than the peer's liveness window,
    /// otherwise a healthy peer's pong arrives after its read deadline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("max_message_size", self.max_message_size == 0),
            ("read_wait", self.read_wait.is_zero()),
            ("write_wait", self.write_wait.is_zero()),
            ("pong_wait", self.pong_wait.is_zero()),
            ("ping_period", self.ping_period.is_zero()),
            ("mailbox_capacity", self.mailbox_capacity == 0),
            ("inbound_capacity", self.inbound_capacity == 0),
            ("max_players", self.max_players == Some(0)),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, zero)| *zero) {
            return Err(ConfigError::Zero(name));
        }

        if self.ping_period >= self.pong_wait {
            return Err(ConfigError::PingPeriodTooLong {
                ping_period: self.ping_period,
                pong_wait: self.pong_wait,
            });
        }

        Ok(())
    }
}
