//! Room: roster, pumps and the coordination queues.
//!
//! ## Lifecycle
//!
//! `Room::new` → `start` → (`join` / departures / `broadcast` ...) → `stop`.
//!
//! ## Concurrency
//!
//! All roster mutation happens under one lock, either from `join` or from the
//! departure loop started by `start`. Pumps never touch the roster; they talk
//! to the room only through the inbound queue and the departure queue.

use std::sync::{Arc, Weak};

use tokio::{
    sync::{Mutex, mpsc},
    task::{JoinHandle, JoinSet},
    time::timeout,
};

use gameroom_shared::time::get_jst_timestamp;

use crate::{
    config::{ConfigError, RoomConfig},
    domain::{
        Admission, Connection, InboundMessage, JoinError, OutboundMessage, Player, PlayerInfo,
        PlayerName, RoomError, RoomId, Roster, SendError, Timestamp,
    },
    pump::{PumpExit, inbound, outbound},
};

/// Membership changes, in the order the room applied them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    Joined { name: PlayerName, is_host: bool },
    Left { name: PlayerName },
    HostChanged { name: PlayerName },
    /// The last player left
    Emptied,
}

/// Streams handed to game logic by [`Room::start`]
pub struct RoomChannels {
    /// Messages from every player, FIFO per sender
    pub inbound: mpsc::Receiver<InboundMessage>,
    pub events: mpsc::UnboundedReceiver<RoomEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Stopped,
}

struct RoomState {
    phase: Phase,
    roster: Roster,
    pumps: JoinSet<PumpExit>,
    /// Taken by `start`
    channels: Option<(RoomChannels, mpsc::UnboundedReceiver<Arc<Player>>)>,
    departure_loop: Option<JoinHandle<()>>,
    /// Dropped by `stop` so the consumer sees both streams end
    inbound_tx: Option<mpsc::Sender<InboundMessage>>,
    events_tx: Option<mpsc::UnboundedSender<RoomEvent>>,
}

impl RoomState {
    /// Events are sent under the room lock so that their order matches the
    /// order of roster changes.
    fn emit(&self, event: RoomEvent) {
        let sent = match &self.events_tx {
            Some(events_tx) => events_tx.send(event).is_ok(),
            None => false,
        };
        if !sent {
            tracing::trace!("No consumer for room events");
        }
    }
}

pub struct Room {
    id: RoomId,
    created_at: Timestamp,
    config: RoomConfig,
    state: Mutex<RoomState>,
    departures_tx: mpsc::UnboundedSender<Arc<Player>>,
}

impl Room {
    /// Create a room. Nobody can join before [`start`](Self::start).
    pub fn new(config: RoomConfig) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;

        let (inbound_tx, inbound) = mpsc::channel(config.inbound_capacity);
        let (departures_tx, departures) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        Ok(Arc::new(Self {
            id: RoomId::generate(),
            created_at: Timestamp::new(get_jst_timestamp()),
            state: Mutex::new(RoomState {
                phase: Phase::Created,
                roster: Roster::new(config.max_players),
                pumps: JoinSet::new(),
                channels: Some((RoomChannels { inbound, events }, departures)),
                departure_loop: None,
                inbound_tx: Some(inbound_tx),
                events_tx: Some(events_tx),
            }),
            config,
            departures_tx,
        }))
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Open the room and start consuming departures.
    ///
    /// Returns the inbound message queue and the membership events for game
    /// logic to consume.
    pub async fn start(self: &Arc<Self>) -> Result<RoomChannels, RoomError> {
        let mut state = self.state.lock().await;
        match state.phase {
            Phase::Created => {}
            Phase::Running => return Err(RoomError::AlreadyStarted),
            Phase::Stopped => return Err(RoomError::Stopped),
        }
        let Some((channels, departures)) = state.channels.take() else {
            return Err(RoomError::AlreadyStarted);
        };

        state.phase = Phase::Running;
        state.departure_loop = Some(tokio::spawn(departure_loop(
            Arc::downgrade(self),
            departures,
        )));
        tracing::info!("Room {} started", self.id);

        Ok(channels)
    }

    /// Check whether a player named `name` could join right now, without
    /// admitting anyone.
    pub async fn check_admission(&self, name: &PlayerName) -> Result<(), JoinError> {
        let state = self.state.lock().await;
        Self::check_phase(state.phase)?;
        state.roster.check_admission(name)
    }

    /// Admit a player and start its pumps.
    ///
    /// On error the player is not admitted, no pump is started and the
    /// connection is dropped.
    pub async fn join<C: Connection>(
        &self,
        admission: Admission<C>,
    ) -> Result<Arc<Player>, JoinError> {
        let (player, mailbox, connection) = admission.into_parts();

        let mut state = self.state.lock().await;
        Self::check_phase(state.phase)?;
        let Some(inbound_tx) = state.inbound_tx.clone() else {
            return Err(JoinError::Stopped);
        };
        let is_host = state.roster.admit(Arc::clone(&player))?;

        let (reader, writer) = connection.split();
        state.pumps.spawn(inbound::run(
            reader,
            Arc::clone(&player),
            inbound_tx,
            self.departures_tx.clone(),
            (&self.config).into(),
        ));
        state.pumps.spawn(outbound::run(
            writer,
            mailbox,
            Arc::clone(&player),
            self.departures_tx.clone(),
            (&self.config).into(),
        ));

        tracing::info!(
            "Player '{}' joined room {}{}",
            player.name(),
            self.id,
            if is_host { " as host" } else { "" }
        );
        state.emit(RoomEvent::Joined {
            name: player.name().clone(),
            is_host,
        });

        Ok(player)
    }

    /// Remove a departed player. A player that is no longer a member is
    /// ignored, so each pump may report the same player.
    pub(crate) async fn leave(&self, player: &Arc<Player>) {
        let mut state = self.state.lock().await;
        while state.pumps.try_join_next().is_some() {}
        let Some(removal) = state.roster.remove(player) else {
            tracing::trace!("'{}' already left room {}", player.name(), self.id);
            return;
        };

        player.close_mailbox();
        player.disconnect();
        tracing::info!("Player '{}' left room {}", player.name(), self.id);
        state.emit(RoomEvent::Left {
            name: player.name().clone(),
        });

        if let Some(host) = removal.new_host {
            tracing::info!("'{}' is now host of room {}", host.name(), self.id);
            state.emit(RoomEvent::HostChanged {
                name: host.name().clone(),
            });
        }
        if removal.now_empty {
            tracing::info!("Room {} is empty", self.id);
            state.emit(RoomEvent::Emptied);
        }
    }

    /// Enqueue `message` for every player. Returns how many accepted it;
    /// failures are logged and otherwise ignored.
    pub async fn broadcast(&self, message: OutboundMessage) -> usize {
        let state = self.state.lock().await;
        let mut delivered = 0;
        for player in state.roster.players() {
            match player.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Failed to broadcast to '{}': {}", player.name(), e),
            }
        }
        delivered
    }

    /// Enqueue `message` for one player.
    pub async fn send_to(
        &self,
        name: &PlayerName,
        message: OutboundMessage,
    ) -> Result<(), SendError> {
        let state = self.state.lock().await;
        let player = state
            .roster
            .find(name)
            .ok_or_else(|| SendError::PlayerNotFound(name.clone()))?;
        player.send(message)
    }

    /// Close a player's mailbox: queued messages are flushed, then the
    /// connection is closed and the player departs.
    pub async fn kick(&self, name: &PlayerName) -> Result<(), SendError> {
        let state = self.state.lock().await;
        let player = state
            .roster
            .find(name)
            .ok_or_else(|| SendError::PlayerNotFound(name.clone()))?;
        if player.close_mailbox() {
            tracing::info!("Kicking '{}' from room {}", name, self.id);
        }
        Ok(())
    }

    /// Players in join order
    pub async fn players(&self) -> Vec<PlayerInfo> {
        self.state.lock().await.roster.infos()
    }

    pub async fn host(&self) -> Option<PlayerName> {
        let state = self.state.lock().await;
        state.roster.host().map(|host| host.name().clone())
    }

    pub async fn is_locked(&self) -> bool {
        self.state.lock().await.roster.is_locked()
    }

    /// While locked, joins fail with [`JoinError::RoomLocked`]. Members stay.
    pub async fn set_locked(&self, locked: bool) {
        self.state.lock().await.roster.set_locked(locked);
        tracing::info!(
            "Room {} {}",
            self.id,
            if locked { "locked" } else { "unlocked" }
        );
    }

    /// Close the room. When this returns no pump is running anymore.
    ///
    /// Mailboxes are closed first so each outbound pump can flush and send a
    /// close frame; pumps still running after `write_wait` are disconnected
    /// and finally aborted. Calling `stop` again does nothing.
    ///
    /// Once the pumps are gone the inbound queue and the event stream end.
    pub async fn stop(&self) {
        let (players, mut pumps, departure_loop) = {
            let mut state = self.state.lock().await;
            if state.phase == Phase::Stopped {
                return;
            }
            state.phase = Phase::Stopped;

            let players = state.roster.drain();
            for player in &players {
                state.emit(RoomEvent::Left {
                    name: player.name().clone(),
                });
            }
            if !players.is_empty() {
                state.emit(RoomEvent::Emptied);
            }
            // pumps hold the remaining inbound senders until they are joined
            state.events_tx = None;
            state.inbound_tx = None;

            (
                players,
                std::mem::take(&mut state.pumps),
                state.departure_loop.take(),
            )
        };
        tracing::info!("Stopping room {} ({} players)", self.id, players.len());

        for player in &players {
            player.close_mailbox();
        }
        if timeout(self.config.write_wait, join_all(&mut pumps))
            .await
            .is_err()
        {
            tracing::warn!("Pumps of room {} did not stop in time, disconnecting", self.id);
            for player in &players {
                player.disconnect();
            }
            if timeout(self.config.write_wait, join_all(&mut pumps))
                .await
                .is_err()
            {
                pumps.abort_all();
                join_all(&mut pumps).await;
            }
        }

        if let Some(departure_loop) = departure_loop {
            departure_loop.abort();
            let _ = departure_loop.await;
        }

        tracing::info!("Room {} stopped", self.id);
    }

    fn check_phase(phase: Phase) -> Result<(), JoinError> {
        match phase {
            Phase::Running => Ok(()),
            Phase::Created => Err(JoinError::NotStarted),
            Phase::Stopped => Err(JoinError::Stopped),
        }
    }

}

/// Consume departures until the room is dropped or stopped.
async fn departure_loop(room: Weak<Room>, mut departures: mpsc::UnboundedReceiver<Arc<Player>>) {
    while let Some(player) = departures.recv().await {
        let Some(room) = room.upgrade() else {
            break;
        };
        room.leave(&player).await;
    }
}

async fn join_all(pumps: &mut JoinSet<PumpExit>) {
    while let Some(result) = pumps.join_next().await {
        if let Err(e) = result
            && e.is_panic()
        {
            tracing::error!("Pump panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Frame,
        infrastructure::connection::{MemoryConnection, MemoryPeer, memory::DEFAULT_WRITE_CAPACITY, memory_pair},
        infrastructure::dto::websocket::ServerMessage,
    };
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    async fn started_room(config: RoomConfig) -> (Arc<Room>, RoomChannels) {
        let room = Room::new(config).unwrap();
        let channels = room.start().await.unwrap();
        (room, channels)
    }

    fn admission(name: &str) -> (Admission<MemoryConnection>, MemoryPeer) {
        let (connection, peer) = memory_pair(DEFAULT_WRITE_CAPACITY);
        let admission = Admission::accept(connection, name.to_string(), 16).unwrap();
        (admission, peer)
    }

    async fn join(room: &Room, name: &str) -> Result<(Arc<Player>, MemoryPeer), JoinError> {
        let (admission, peer) = admission(name);
        room.join(admission).await.map(|player| (player, peer))
    }

    fn name(raw: &str) -> PlayerName {
        PlayerName::new(raw.to_string()).unwrap()
    }

    async fn names(room: &Room) -> Vec<String> {
        room.players()
            .await
            .into_iter()
            .map(|info| info.name.into_string())
            .collect()
    }

    async fn next_event(channels: &mut RoomChannels) -> RoomEvent {
        timeout(WAIT, channels.events.recv())
            .await
            .expect("timed out waiting for room event")
            .expect("event stream closed")
    }

    /// Next non-ping frame written to the peer
    async fn next_frame(peer: &mut MemoryPeer) -> Option<Frame> {
        loop {
            match timeout(WAIT, peer.recv()).await.expect("timed out waiting for frame") {
                Some(Frame::Ping(_)) => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn test_joins_with_distinct_names() {
        // テスト項目: 異なる名前で N 人参加すると名簿は N 人で、最初の参加者がホスト
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;

        // when (操作):
        let mut peers = Vec::new();
        for raw in ["alice", "bob", "charlie", "dave"] {
            peers.push(join(&room, raw).await.unwrap());
        }

        // then (期待する結果):
        let players = room.players().await;
        assert_eq!(players.len(), 4);
        assert!(players[0].is_host);
        assert!(players[1..].iter().all(|p| !p.is_host));
        assert_eq!(room.host().await, Some(name("alice")));
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::Joined {
                name: name("alice"),
                is_host: true
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_scenario() {
        // テスト項目: Alice(ホスト)、Bob が参加後、Alice の再参加は重複エラーで名簿は変わらない
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        let (alice, _alice_peer) = join(&room, "Alice").await.unwrap();
        let (_bob, _bob_peer) = join(&room, "Bob").await.unwrap();

        // when (操作):
        let (second_alice, mut second_peer) = admission("Alice");
        let result = room.join(second_alice).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), JoinError::DuplicateName(name("Alice")));
        assert_eq!(names(&room).await, vec!["Alice", "Bob"]);
        assert!(alice.is_host());
        // rejected connection is dropped without starting pumps
        assert_eq!(second_peer.recv().await, None);
    }

    #[tokio::test]
    async fn test_join_before_start_fails() {
        // テスト項目: start 前の参加は NotStarted エラー
        // given (前提条件):
        let room = Room::new(RoomConfig::default()).unwrap();

        // when (操作):
        let result = join(&room, "alice").await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinError::NotStarted)));
        assert!(room.players().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        // テスト項目: 2 回目の start はエラー
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;

        // when (操作):
        let result = room.start().await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_locked_room_rejects_join() {
        // テスト項目: ロック中の部屋には参加できず、ロック解除後は参加できる
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        room.set_locked(true).await;

        // when (操作):
        let locked = join(&room, "alice").await;
        room.set_locked(false).await;
        let unlocked = join(&room, "alice").await;

        // then (期待する結果):
        assert!(matches!(locked, Err(JoinError::RoomLocked)));
        assert!(unlocked.is_ok());
        assert_eq!(names(&room).await, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_full_room_rejects_join() {
        // テスト項目: 定員に達した部屋には参加できない
        // given (前提条件):
        let config = RoomConfig {
            max_players: Some(1),
            ..RoomConfig::default()
        };
        let (room, _channels) = started_room(config).await;
        let _alice = join(&room, "alice").await.unwrap();

        // when (操作):
        let result = join(&room, "bob").await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinError::RoomFull(1))));
    }

    #[tokio::test]
    async fn test_inbound_messages_reach_the_queue_tagged() {
        // テスト項目: 参加者のメッセージが送信者付きで受信キューに届く
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;
        let (alice, alice_peer) = join(&room, "alice").await.unwrap();

        // when (操作):
        for content in ["m1", "m2", "m3"] {
            alice_peer.send_content(content);
        }

        // then (期待する結果):
        for expected in ["m1", "m2", "m3"] {
            let message = timeout(WAIT, channels.inbound.recv()).await.unwrap().unwrap();
            assert_eq!(message.content, expected);
            assert!(Arc::ptr_eq(&message.sender, &alice));
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_player() {
        // テスト項目: ブロードキャストが全参加者に届く
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        let (_alice, mut alice_peer) = join(&room, "alice").await.unwrap();
        let (_bob, mut bob_peer) = join(&room, "bob").await.unwrap();

        // when (操作):
        let delivered = room.broadcast(OutboundMessage::system("round 1")).await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        for peer in [&mut alice_peer, &mut bob_peer] {
            let Some(Frame::Text(text)) = next_frame(peer).await else {
                panic!("expected text frame");
            };
            let message: ServerMessage = serde_json::from_str(&text).unwrap();
            assert_eq!(message.content, "round 1");
        }
    }

    #[tokio::test]
    async fn test_send_to_unknown_player_fails() {
        // テスト項目: 存在しないプレイヤーへの送信はエラー
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;

        // when (操作):
        let result = room
            .send_to(&name("ghost"), OutboundMessage::system("boo"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendError::PlayerNotFound(name("ghost"))));
    }

    #[tokio::test]
    async fn test_disconnected_player_leaves_and_host_moves() {
        // テスト項目: ホストの接続が切れると名簿から外れ、次に古い参加者がホストになる
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;
        let (_alice, alice_peer) = join(&room, "alice").await.unwrap();
        let (bob, _bob_peer) = join(&room, "bob").await.unwrap();
        next_event(&mut channels).await;
        next_event(&mut channels).await;

        // when (操作):
        drop(alice_peer);

        // then (期待する結果):
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::Left {
                name: name("alice")
            }
        );
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::HostChanged { name: name("bob") }
        );
        assert_eq!(names(&room).await, vec!["bob"]);
        assert!(bob.is_host());
        assert_eq!(room.host().await, Some(name("bob")));
    }

    #[tokio::test]
    async fn test_last_player_leaving_empties_room() {
        // テスト項目: 最後の参加者が抜けると Emptied イベントが出る
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;
        let (_alice, alice_peer) = join(&room, "alice").await.unwrap();
        next_event(&mut channels).await;

        // when (操作):
        alice_peer.send(Frame::Close);

        // then (期待する結果):
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::Left {
                name: name("alice")
            }
        );
        assert_eq!(next_event(&mut channels).await, RoomEvent::Emptied);
        assert!(room.host().await.is_none());
    }

    #[tokio::test]
    async fn test_kick_flushes_and_closes() {
        // テスト項目: キックすると送信済みメッセージの後に close フレームが送られ、退室する
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;
        let (_alice, mut alice_peer) = join(&room, "alice").await.unwrap();
        next_event(&mut channels).await;
        room.send_to(&name("alice"), OutboundMessage::system("bye"))
            .await
            .unwrap();

        // when (操作):
        room.kick(&name("alice")).await.unwrap();

        // then (期待する結果):
        assert!(matches!(next_frame(&mut alice_peer).await, Some(Frame::Text(_))));
        assert_eq!(next_frame(&mut alice_peer).await, Some(Frame::Close));
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::Left {
                name: name("alice")
            }
        );
    }

    #[tokio::test]
    async fn test_stale_departure_keeps_rejoined_player() {
        // テスト項目: 同名で再参加したプレイヤーは古いプレイヤーの離脱処理で削除されない
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        let (old_alice, _old_peer) = join(&room, "alice").await.unwrap();
        room.leave(&old_alice).await;
        let (new_alice, _new_peer) = join(&room, "alice").await.unwrap();

        // when (操作):
        room.leave(&old_alice).await;

        // then (期待する結果):
        assert_eq!(names(&room).await, vec!["alice"]);
        assert!(new_alice.is_host());
    }

    #[tokio::test]
    async fn test_stop_closes_every_connection() {
        // テスト項目: stop 後はすべての接続が閉じられ、参加もできない
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        let (alice, mut alice_peer) = join(&room, "alice").await.unwrap();
        let (bob, mut bob_peer) = join(&room, "bob").await.unwrap();

        // when (操作):
        room.stop().await;

        // then (期待する結果):
        for peer in [&mut alice_peer, &mut bob_peer] {
            assert_eq!(next_frame(peer).await, Some(Frame::Close));
            assert_eq!(next_frame(peer).await, None);
        }
        assert!(alice.closer().is_closed());
        assert!(bob.closer().is_closed());
        assert!(room.players().await.is_empty());
        assert!(matches!(join(&room, "carol").await, Err(JoinError::Stopped)));

        // stopping again is a no-op
        room.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_events_follow_roster_order() {
        // テスト項目: 参加と離脱が並行しても、イベントは名簿の変更順に届く
        for _ in 0..200 {
            // given (前提条件):
            let (room, mut channels) = started_room(RoomConfig::default()).await;
            let (gone, gone_peer) = admission("alice");
            drop(gone_peer);

            // when (操作):
            room.join(gone).await.unwrap();
            let _bob = join(&room, "bob").await.unwrap();

            // then (期待する結果):
            let mut members: Vec<PlayerName> = Vec::new();
            for _ in 0..4 {
                match next_event(&mut channels).await {
                    RoomEvent::Joined { name, is_host } => {
                        assert!(!members.contains(&name), "joined twice: {}", name);
                        assert_eq!(is_host, members.is_empty());
                        members.push(name);
                    }
                    RoomEvent::Left { name } => {
                        assert!(members.contains(&name), "left before joining: {}", name);
                        members.retain(|member| member != &name);
                    }
                    RoomEvent::HostChanged { name } => {
                        assert_eq!(members.first(), Some(&name));
                    }
                    RoomEvent::Emptied => assert!(members.is_empty(), "emptied with {:?}", members),
                }
            }
            assert_eq!(members, vec![name("bob")]);
            room.stop().await;
        }
    }

    #[tokio::test]
    async fn test_stop_ends_consumer_streams() {
        // テスト項目: stop 後は受信キューとイベントが終端し、最後に Left と Emptied が届く
        // given (前提条件):
        let (room, mut channels) = started_room(RoomConfig::default()).await;
        let (_alice, _alice_peer) = join(&room, "alice").await.unwrap();
        next_event(&mut channels).await;

        // when (操作):
        room.stop().await;

        // then (期待する結果):
        assert_eq!(
            next_event(&mut channels).await,
            RoomEvent::Left {
                name: name("alice")
            }
        );
        assert_eq!(next_event(&mut channels).await, RoomEvent::Emptied);
        assert!(timeout(WAIT, channels.events.recv()).await.unwrap().is_none());
        assert!(timeout(WAIT, channels.inbound.recv()).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_stuck_pumps() {
        // テスト項目: 書き込みが詰まったポンプがあっても stop は完了する
        // given (前提条件):
        let (room, _channels) = started_room(RoomConfig::default()).await;
        let (connection, _peer) = memory_pair(1);
        let admission = Admission::accept(connection, "alice".to_string(), 16).unwrap();
        let alice = room.join(admission).await.unwrap();
        alice.send(OutboundMessage::system("fills the pipe")).unwrap();
        alice.send(OutboundMessage::system("blocks")).unwrap();

        // when (操作):
        let result = timeout(Duration::from_secs(30), room.stop()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(alice.closer().is_closed());
    }
}
