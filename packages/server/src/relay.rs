//! Default consumer of a room: echoes every message to every player and
//! announces arrivals and departures.

use std::sync::Arc;

use crate::{
    domain::OutboundMessage,
    room::{Room, RoomChannels, RoomEvent},
};

pub struct Relay {
    room: Arc<Room>,
}

impl Relay {
    pub fn new(room: Arc<Room>) -> Self {
        Self { room }
    }

    /// Consume `channels` until the room is stopped.
    pub async fn run(self, channels: RoomChannels) {
        let RoomChannels {
            mut inbound,
            mut events,
        } = channels;
        let mut events_open = true;

        loop {
            tokio::select! {
                message = inbound.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    let outbound = OutboundMessage::from_player(
                        message.content,
                        message.sender.name().clone(),
                    );
                    let delivered = self.room.broadcast(outbound).await;
                    tracing::debug!(
                        "Relayed message from '{}' to {} players",
                        message.sender.name(),
                        delivered
                    );
                }
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => self.announce(event).await,
                        None => events_open = false,
                    }
                }
            }
        }
        tracing::info!("Relay for room {} finished", self.room.id());
    }

    async fn announce(&self, event: RoomEvent) {
        let notice = match event {
            RoomEvent::Joined { name, is_host } if is_host => {
                format!("{} joined the room as host", name)
            }
            RoomEvent::Joined { name, .. } => format!("{} joined the room", name),
            RoomEvent::Left { name } => format!("{} left the room", name),
            RoomEvent::HostChanged { name } => format!("{} is now the host", name),
            RoomEvent::Emptied => return,
        };
        self.room.broadcast(OutboundMessage::system(notice)).await;
    }
}
