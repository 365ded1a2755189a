//! Player entity and admission.

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::mpsc::{self, error::TrySendError};

use gameroom_shared::time::get_jst_timestamp;

use super::{
    connection::{Connection, ConnectionCloser},
    error::{NameError, SendError},
    message::OutboundMessage,
    value_object::{PlayerName, Timestamp},
};

/// Outbound mailbox handed to the outbound pump
pub type MailboxReceiver = mpsc::Receiver<OutboundMessage>;

/// One connected participant of a room.
///
/// The player owns the sending side of its outbound mailbox and the close
/// signal of its connection. The connection halves themselves belong to the
/// pumps.
pub struct Player {
    name: PlayerName,
    is_host: AtomicBool,
    joined_at: Timestamp,
    mailbox: Mutex<Option<mpsc::Sender<OutboundMessage>>>,
    closer: ConnectionCloser,
}

impl Player {
    /// Create a player together with the receiving side of its mailbox.
    pub fn new(name: PlayerName, mailbox_capacity: usize) -> (Arc<Self>, MailboxReceiver) {
        let (tx, rx) = mpsc::channel(mailbox_capacity);
        let player = Arc::new(Self {
            name,
            is_host: AtomicBool::new(false),
            joined_at: Timestamp::new(get_jst_timestamp()),
            mailbox: Mutex::new(Some(tx)),
            closer: ConnectionCloser::new(),
        });
        (player, rx)
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        self.is_host.load(Ordering::Acquire)
    }

    /// Only the roster changes the host flag, under the room lock.
    pub(crate) fn set_host(&self, is_host: bool) {
        self.is_host.store(is_host, Ordering::Release);
    }

    pub fn joined_at(&self) -> Timestamp {
        self.joined_at
    }

    pub fn closer(&self) -> &ConnectionCloser {
        &self.closer
    }

    /// Enqueue a message for this player without waiting.
    ///
    /// A full mailbox means the peer cannot keep up: the mailbox is closed,
    /// which makes the outbound pump send a close frame and disconnect.
    pub fn send(&self, message: OutboundMessage) -> Result<(), SendError> {
        let mut mailbox = self.lock_mailbox();
        let Some(sender) = mailbox.as_ref() else {
            return Err(SendError::MailboxClosed(self.name.clone()));
        };

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    "Mailbox of '{}' is full, dropping slow player",
                    self.name
                );
                mailbox.take();
                Err(SendError::MailboxFull(self.name.clone()))
            }
            Err(TrySendError::Closed(_)) => {
                mailbox.take();
                Err(SendError::MailboxClosed(self.name.clone()))
            }
        }
    }

    /// Close the mailbox. Messages already queued are still delivered, then
    /// the outbound pump sends a close frame and exits.
    ///
    /// Returns `false` if it was already closed.
    pub fn close_mailbox(&self) -> bool {
        self.lock_mailbox().take().is_some()
    }

    /// Tear the connection down without the close handshake.
    pub fn disconnect(&self) -> bool {
        self.closer.close()
    }

    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            name: self.name.clone(),
            is_host: self.is_host(),
            joined_at: self.joined_at,
        }
    }

    fn lock_mailbox(&self) -> MutexGuard<'_, Option<mpsc::Sender<OutboundMessage>>> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("is_host", &self.is_host())
            .field("joined_at", &self.joined_at)
            .finish_non_exhaustive()
    }
}

/// Snapshot of a player for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: PlayerName,
    pub is_host: bool,
    pub joined_at: Timestamp,
}

/// An accepted connection with a claimed name, not yet a member of any room.
///
/// Dropping an admission drops the connection.
pub struct Admission<C: Connection> {
    player: Arc<Player>,
    mailbox: MailboxReceiver,
    connection: C,
}

impl<C: Connection> Admission<C> {
    pub fn new(connection: C, name: PlayerName, mailbox_capacity: usize) -> Self {
        let (player, mailbox) = Player::new(name, mailbox_capacity);
        Self {
            player,
            mailbox,
            connection,
        }
    }

    /// Validate `name` and wrap the connection.
    pub fn accept(connection: C, name: String, mailbox_capacity: usize) -> Result<Self, NameError> {
        let name = PlayerName::new(name)?;
        Ok(Self::new(connection, name, mailbox_capacity))
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    pub(crate) fn into_parts(self) -> (Arc<Player>, MailboxReceiver, C) {
        (self.player, self.mailbox, self.connection)
    }
}
