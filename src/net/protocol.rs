//! Wire protocol message definitions
//! These are the message shapes exchanged with the world server

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cardinal direction an avatar can face on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    South,
    East,
    /// Never authored as its own frame set; rendered by mirroring east
    West,
}

impl Default for Facing {
    fn default() -> Self {
        Self::South
    }
}

impl Facing {
    /// Parse a frame-row key from an avatar definition. Unrecognized keys
    /// are skipped by callers, mirroring the unknown-action stance.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            "east" => Some(Self::East),
            "west" => Some(Self::West),
            _ => None,
        }
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Join request, sent once when the connection opens
    Join { username: String },
}

/// Messages pushed from server to client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Response to the join request
    #[serde(rename_all = "camelCase")]
    Join {
        success: bool,
        /// The id assigned to the local player (present on success)
        #[serde(default)]
        player_id: Option<String>,
        /// Full snapshot of connected players at join time
        #[serde(default)]
        players: HashMap<String, PlayerRecord>,
        /// Avatar definitions for every avatar referenced by the snapshot
        #[serde(default)]
        avatars: HashMap<String, AvatarDef>,
        /// Rejection reason (present on failure)
        #[serde(default)]
        error: Option<String>,
    },

    /// A player entered the session
    PlayerJoined {
        player: PlayerRecord,
        /// Definition for the joiner's avatar, if the server considers it new
        #[serde(default)]
        avatar: Option<AvatarDef>,
    },

    /// Authoritative replacement records for a subset of players
    PlayersMoved {
        players: HashMap<String, PlayerRecord>,
    },

    /// A player disconnected
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: String },

    /// Forward-compatible fallback for unrecognized actions
    #[serde(other)]
    Unknown,
}

/// Player record fields consumed by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default)]
    pub animation_frame: usize,
    /// Name key into the avatar registry
    #[serde(default)]
    pub avatar: String,
}

/// Avatar definition: animation frame sources keyed by facing direction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvatarDef {
    #[serde(default)]
    pub name: String,
    /// Ordered frame sources (paths, URLs or data URIs) per direction key
    #[serde(default)]
    pub frames: HashMap<String, Vec<String>>,
}
