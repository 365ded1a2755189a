//! Inbound pump: player connection → room inbound queue.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    time::{Instant, timeout, timeout_at},
};

use crate::{
    config::RoomConfig,
    domain::{ConnectionError, Frame, FrameReader, InboundMessage, Player},
    infrastructure::dto::websocket::ClientMessage,
};

use super::{DepartureGuard, DepartureSender, PumpExit, log_exit};

/// Limits applied by the inbound pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundLimits {
    pub max_message_size: usize,
    /// Read deadline, re-armed by every pong and every application message
    pub pong_wait: Duration,
    /// Bound on handing one message to the inbound queue
    pub read_wait: Duration,
}

impl From<&RoomConfig> for InboundLimits {
    fn from(config: &RoomConfig) -> Self {
        Self {
            max_message_size: config.max_message_size,
            pong_wait: config.pong_wait,
            read_wait: config.read_wait,
        }
    }
}

/// Read messages from `reader` until the connection fails or is closed,
/// forwarding each one to `inbound` tagged with `player`.
pub async fn run<R: FrameReader>(
    mut reader: R,
    player: Arc<Player>,
    inbound: mpsc::Sender<InboundMessage>,
    departures: DepartureSender,
    limits: InboundLimits,
) -> PumpExit {
    let _guard = DepartureGuard::new(Arc::clone(&player), departures, "inbound");

    let exit = read_loop(&mut reader, &player, &inbound, limits).await;
    log_exit(&player, "inbound", &exit);
    exit
}

async fn read_loop<R: FrameReader>(
    reader: &mut R,
    player: &Arc<Player>,
    inbound: &mpsc::Sender<InboundMessage>,
    limits: InboundLimits,
) -> PumpExit {
    let closer = player.closer();
    let mut deadline = Instant::now() + limits.pong_wait;

    loop {
        let frame = tokio::select! {
            _ = closer.closed() => return PumpExit::Shutdown,
            read = timeout_at(deadline, reader.read_frame()) => match read {
                Ok(Ok(frame)) => frame,
                Ok(Err(e)) => return PumpExit::Connection(e),
                Err(_) => return PumpExit::Connection(ConnectionError::DeadlineExpired),
            },
        };

        let payload = match frame {
            Frame::Text(text) => text.into_bytes(),
            Frame::Binary(data) => data,
            Frame::Pong(_) => {
                deadline = Instant::now() + limits.pong_wait;
                continue;
            }
            // answered by the transport
            Frame::Ping(_) => continue,
            Frame::Close => return PumpExit::PeerClosed,
        };

        let content = match decode(&payload, limits.max_message_size) {
            Ok(content) => content,
            Err(e) => return PumpExit::Connection(e),
        };
        deadline = Instant::now() + limits.pong_wait;
        tracing::trace!("Received message from '{}'", player.name());

        let message = InboundMessage::new(content, Arc::clone(player));
        tokio::select! {
            _ = closer.closed() => return PumpExit::Shutdown,
            sent = timeout(limits.read_wait, inbound.send(message)) => match sent {
                Ok(Ok(())) => {}
                Ok(Err(_)) => return PumpExit::RoomClosed,
                Err(_) => return PumpExit::Stalled,
            },
        }
    }
}

/// Decode one application message, enforcing the size limit.
pub(crate) fn decode(payload: &[u8], limit: usize) -> Result<String, ConnectionError> {
    if payload.len() > limit {
        return Err(ConnectionError::MessageTooLarge {
            size: payload.len(),
            limit,
        });
    }

    serde_json::from_slice::<ClientMessage>(payload)
        .map(|message| message.content)
        .map_err(|e| ConnectionError::Malformed(e.to_string()))
}
