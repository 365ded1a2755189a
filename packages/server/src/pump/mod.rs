//! Per-player pumps.
//!
//! Every member of a room runs two tasks: the inbound pump reads the
//! connection and feeds the room's inbound queue, the outbound pump drains the
//! player's mailbox to the connection and keeps it alive with pings. Either
//! pump ending closes the connection, which ends the other one, and each pump
//! reports the player on the departure queue exactly once.

pub mod inbound;
pub mod outbound;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{ConnectionError, Player};

pub(crate) type DepartureSender = mpsc::UnboundedSender<Arc<Player>>;

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// Read or write failed, including deadline expiry
    Connection(ConnectionError),
    /// The peer sent a close frame
    PeerClosed,
    /// The mailbox was closed and the close frame was sent (or attempted)
    MailboxClosed,
    /// The other pump, or the room, closed the connection
    Shutdown,
    /// Nobody consumes the inbound queue anymore
    RoomClosed,
    /// The inbound queue stayed full for longer than the read wait
    Stalled,
}

impl PumpExit {
    /// Exits that are part of a normal disconnect
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PumpExit::PeerClosed
                | PumpExit::MailboxClosed
                | PumpExit::Shutdown
                | PumpExit::RoomClosed
                | PumpExit::Connection(ConnectionError::Closed)
        )
    }
}

/// Reports the departure and closes the connection when a pump ends, on
/// every exit path including task abort.
struct DepartureGuard {
    player: Arc<Player>,
    departures: DepartureSender,
    pump: &'static str,
}

impl DepartureGuard {
    fn new(player: Arc<Player>, departures: DepartureSender, pump: &'static str) -> Self {
        Self {
            player,
            departures,
            pump,
        }
    }
}

impl Drop for DepartureGuard {
    fn drop(&mut self) {
        if self.departures.send(Arc::clone(&self.player)).is_err() {
            tracing::debug!(
                "Departure queue closed, {} pump of '{}' not reported",
                self.pump,
                self.player.name()
            );
        }
        if self.player.disconnect() {
            tracing::debug!(
                "Connection of '{}' closed by {} pump",
                self.player.name(),
                self.pump
            );
        }
    }
}

/// Log the end of a pump at a level matching its cause.
fn log_exit(player: &Player, pump: &str, exit: &PumpExit) {
    if exit.is_expected() {
        tracing::debug!("{} pump of '{}' stopped: {:?}", pump, player.name(), exit);
    } else {
        tracing::warn!("{} pump of '{}' failed: {:?}", pump, player.name(), exit);
    }
}
