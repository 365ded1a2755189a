//! Domain layer: players, roster rules and the connection contract.

pub mod connection;
pub mod error;
pub mod message;
pub mod player;
pub mod roster;
pub mod value_object;

pub use connection::{Connection, ConnectionCloser, Frame, FrameReader, FrameWriter};
pub use error::{ConnectionError, JoinError, NameError, RoomError, SendError};
pub use message::{InboundMessage, OutboundMessage};
pub use player::{Admission, MailboxReceiver, Player, PlayerInfo};
pub use roster::{Removal, Roster};
pub use value_object::{PlayerName, RoomId, Timestamp};
