//! Room membership rules.
//!
//! The roster is plain data. The room guards it with a single lock so that
//! joins and departures never interleave.

use std::sync::{Arc, Weak};

use super::{
    error::JoinError,
    player::{Player, PlayerInfo},
    value_object::PlayerName,
};

/// Result of removing a player from the roster
#[derive(Debug)]
pub struct Removal {
    pub was_host: bool,
    /// Player promoted because the host left
    pub new_host: Option<Arc<Player>>,
    pub now_empty: bool,
}

/// Ordered set of players (join order) with a host and a lock flag.
#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<Arc<Player>>,
    host: Weak<Player>,
    locked: bool,
    max_players: Option<usize>,
}

impl Roster {
    pub fn new(max_players: Option<usize>) -> Self {
        Self {
            max_players,
            ..Self::default()
        }
    }

    /// Check whether a player named `name` could join right now.
    pub fn check_admission(&self, name: &PlayerName) -> Result<(), JoinError> {
        if self.locked {
            return Err(JoinError::RoomLocked);
        }
        if self.find(name).is_some() {
            return Err(JoinError::DuplicateName(name.clone()));
        }
        if let Some(max) = self.max_players
            && self.players.len() >= max
        {
            return Err(JoinError::RoomFull(max));
        }
        Ok(())
    }

    /// Append `player`. The first player becomes host.
    ///
    /// Returns whether the player was made host. On error nothing changes.
    pub fn admit(&mut self, player: Arc<Player>) -> Result<bool, JoinError> {
        self.check_admission(player.name())?;

        let is_host = self.players.is_empty();
        if is_host {
            self.promote(&player);
        }
        self.players.push(player);
        Ok(is_host)
    }

    /// Remove exactly this player (by identity, not by name).
    ///
    /// Returns `None` if it is not a member, e.g. a second departure signal
    /// or a stale one for a name that has since been reused. When the host
    /// leaves, the oldest remaining player is promoted.
    pub fn remove(&mut self, player: &Arc<Player>) -> Option<Removal> {
        let index = self.players.iter().position(|p| Arc::ptr_eq(p, player))?;
        let removed = self.players.remove(index);

        let was_host = removed.is_host();
        removed.set_host(false);

        let new_host = if was_host {
            self.host = Weak::new();
            let next = self.players.first().cloned();
            if let Some(next) = &next {
                self.promote(next);
            }
            next
        } else {
            None
        };

        Some(Removal {
            was_host,
            new_host,
            now_empty: self.players.is_empty(),
        })
    }

    /// Remove every player, e.g. when the room stops.
    pub fn drain(&mut self) -> Vec<Arc<Player>> {
        self.host = Weak::new();
        let players = std::mem::take(&mut self.players);
        for player in &players {
            player.set_host(false);
        }
        players
    }

    pub fn find(&self, name: &PlayerName) -> Option<&Arc<Player>> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    pub fn infos(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(|p| p.info()).collect()
    }

    pub fn host(&self) -> Option<Arc<Player>> {
        self.host.upgrade()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn promote(&mut self, player: &Arc<Player>) {
        player.set_host(true);
        self.host = Arc::downgrade(player);
    }
}
