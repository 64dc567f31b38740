//! Local mirror of the server-synchronized session

use std::collections::HashMap;

use crate::net::protocol::{Facing, PlayerRecord};

/// Connection lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Socket not yet established
    Connecting,
    /// Socket open, join request outstanding
    Unjoined,
    /// Join accepted; the player mapping is live
    Joined,
    /// Socket closed or failed; state is frozen at last-known-good
    Disconnected,
}

/// One mirrored player
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub username: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub animation_frame: usize,
    /// Name key into the avatar registry
    pub avatar: String,
}

impl Player {
    /// Build the local entry from a wire record keyed by `id`. The record
    /// replaces every field; there is no per-field merging.
    pub fn from_record(id: &str, record: &PlayerRecord) -> Self {
        Self {
            id: id.to_string(),
            username: record.username.clone(),
            x: record.x,
            y: record.y,
            facing: record.facing,
            animation_frame: record.animation_frame,
            avatar: record.avatar.clone(),
        }
    }
}

/// Authoritative local mirror of connected players
pub struct SessionState {
    phase: ConnectionPhase,
    local_player_id: Option<String>,
    players: HashMap<String, Player>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: ConnectionPhase::Connecting,
            local_player_id: None,
            players: HashMap::new(),
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: ConnectionPhase) {
        self.phase = phase;
    }

    pub fn local_player_id(&self) -> Option<&str> {
        self.local_player_id.as_deref()
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.get(self.local_player_id.as_deref()?)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Iteration order is unspecified; draw order may vary between frames
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_local(&self, id: &str) -> bool {
        self.local_player_id.as_deref() == Some(id)
    }

    /// Atomically adopt a join snapshot: local identity plus the full
    /// player mapping. Any previous mapping is discarded.
    pub fn adopt_snapshot(&mut self, local_id: String, records: &HashMap<String, PlayerRecord>) {
        self.players = records
            .iter()
            .map(|(id, record)| (id.clone(), Player::from_record(id, record)))
            .collect();
        self.local_player_id = Some(local_id);
    }

    /// Insert or wholesale-overwrite a player by id
    pub fn upsert(&mut self, id: &str, record: &PlayerRecord) {
        self.players
            .insert(id.to_string(), Player::from_record(id, record));
    }

    /// Remove a player; returns whether it was present
    pub fn remove(&mut self, id: &str) -> bool {
        self.players.remove(id).is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, x: f32, y: f32) -> PlayerRecord {
        PlayerRecord {
            id: String::new(),
            username: username.to_string(),
            x,
            y,
            facing: Facing::South,
            animation_frame: 0,
            avatar: "a1".to_string(),
        }
    }

    #[test]
    fn upsert_replaces_the_whole_record() {
        let mut session = SessionState::new();
        session.upsert("p1", &record("ada", 1.0, 2.0));

        let mut moved = record("ada_renamed", 9.0, 9.0);
        moved.facing = Facing::East;
        session.upsert("p1", &moved);

        let player = session.player("p1").unwrap();
        assert_eq!(player.username, "ada_renamed");
        assert_eq!((player.x, player.y), (9.0, 9.0));
        assert_eq!(player.facing, Facing::East);
        assert_eq!(session.player_count(), 1);
    }

    #[test]
    fn snapshot_adoption_discards_previous_players() {
        let mut session = SessionState::new();
        session.upsert("stale", &record("old", 0.0, 0.0));

        let snapshot = HashMap::from([("p1".to_string(), record("ada", 1.0, 1.0))]);
        session.adopt_snapshot("p1".to_string(), &snapshot);

        assert!(session.player("stale").is_none());
        assert_eq!(session.local_player().unwrap().username, "ada");
        assert!(session.is_local("p1"));
    }

    #[test]
    fn remove_reports_presence() {
        let mut session = SessionState::new();
        session.upsert("p1", &record("ada", 0.0, 0.0));
        assert!(session.remove("p1"));
        assert!(!session.remove("p1"));
        assert_eq!(session.player_count(), 0);
    }
}
