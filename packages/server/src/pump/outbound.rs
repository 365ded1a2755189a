//! Outbound pump: player mailbox → connection, plus keepalive pings.

use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant, MissedTickBehavior, timeout};

use crate::{
    config::RoomConfig,
    domain::{ConnectionError, Frame, FrameWriter, MailboxReceiver, OutboundMessage, Player},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{DepartureGuard, DepartureSender, PumpExit, log_exit};

/// Timings applied by the outbound pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundTimings {
    /// Deadline for each ping, message or close frame
    pub write_wait: Duration,
    pub ping_period: Duration,
}

impl From<&RoomConfig> for OutboundTimings {
    fn from(config: &RoomConfig) -> Self {
        Self {
            write_wait: config.write_wait,
            ping_period: config.ping_period,
        }
    }
}

/// Deliver the player's mailbox to `writer` and ping the peer every
/// `ping_period` until a write fails or the mailbox is closed.
pub async fn run<W: FrameWriter>(
    mut writer: W,
    mut mailbox: MailboxReceiver,
    player: Arc<Player>,
    departures: DepartureSender,
    timings: OutboundTimings,
) -> PumpExit {
    let _guard = DepartureGuard::new(Arc::clone(&player), departures, "outbound");

    let exit = write_loop(&mut writer, &mut mailbox, &player, timings).await;
    log_exit(&player, "outbound", &exit);
    exit
}

async fn write_loop<W: FrameWriter>(
    writer: &mut W,
    mailbox: &mut MailboxReceiver,
    player: &Player,
    timings: OutboundTimings,
) -> PumpExit {
    let closer = player.closer();
    let mut keepalive = time::interval_at(Instant::now() + timings.ping_period, timings.ping_period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = closer.closed() => {
                // completes the handshake when the peer initiated the close
                send_close(writer, player, timings.write_wait).await;
                return PumpExit::Shutdown;
            }
            _ = keepalive.tick() => {
                if let Err(e) = write_within(writer, Frame::Ping(Vec::new()), timings.write_wait).await {
                    return PumpExit::Connection(e);
                }
            }
            received = mailbox.recv() => {
                let Some(message) = received else {
                    send_close(writer, player, timings.write_wait).await;
                    return PumpExit::MailboxClosed;
                };

                let frame = match encode(message) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("Failed to serialize message for '{}': {}", player.name(), e);
                        continue;
                    }
                };
                if let Err(e) = write_within(writer, frame, timings.write_wait).await {
                    return PumpExit::Connection(e);
                }
            }
        }
    }
}

async fn write_within<W: FrameWriter>(
    writer: &mut W,
    frame: Frame,
    write_wait: Duration,
) -> Result<(), ConnectionError> {
    timeout(write_wait, writer.write_frame(frame))
        .await
        .unwrap_or(Err(ConnectionError::DeadlineExpired))
}

/// Best-effort close frame
async fn send_close<W: FrameWriter>(writer: &mut W, player: &Player, write_wait: Duration) {
    if let Err(e) = write_within(writer, Frame::Close, write_wait).await {
        tracing::debug!("Close frame to '{}' not sent: {}", player.name(), e);
    }
}

fn encode(message: OutboundMessage) -> Result<Frame, serde_json::Error> {
    serde_json::to_string(&ServerMessage::from(message)).map(Frame::Text)
}
