//! Inbound message decoding and session mutation

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::net::protocol::{AvatarDef, ClientMsg, PlayerRecord, ServerMsg};
use crate::render::avatar::AvatarSet;
use crate::session::state::{ConnectionPhase, SessionState};

/// What a handled message changed, so the coordinator can decide whether
/// to recompute the camera and redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Some visible state changed; a re-render is due
    pub state_changed: bool,
    /// The local player's position was part of the update
    pub local_moved: bool,
}

/// Translates transport messages into session mutations and emits the
/// outbound join request.
pub struct ProtocolAdapter {
    username: String,
    outbound: mpsc::Sender<String>,
}

impl ProtocolAdapter {
    pub fn new(username: String, outbound: mpsc::Sender<String>) -> Self {
        Self { username, outbound }
    }

    /// The socket opened: send the join request and await the response
    pub async fn handle_open(&self, session: &mut SessionState) {
        session.set_phase(ConnectionPhase::Unjoined);
        let join = ClientMsg::Join {
            username: self.username.clone(),
        };
        match serde_json::to_string(&join) {
            Ok(text) => {
                if self.outbound.send(text).await.is_err() {
                    warn!("Transport closed before the join request could be sent");
                }
            }
            Err(e) => error!(error = %e, "Failed to encode join request"),
        }
    }

    /// The socket closed or failed: freeze state at last-known-good.
    /// No reconnect is attempted.
    pub fn handle_close(&self, session: &mut SessionState) {
        session.set_phase(ConnectionPhase::Disconnected);
    }

    /// Decode and apply one inbound message. Malformed payloads are logged
    /// and leave the session untouched.
    pub fn apply(
        &self,
        text: &str,
        session: &mut SessionState,
        avatars: &mut AvatarSet,
    ) -> ApplyOutcome {
        let msg = match serde_json::from_str::<ServerMsg>(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Failed to parse server message");
                return ApplyOutcome::default();
            }
        };

        match msg {
            ServerMsg::Join {
                success,
                player_id,
                players,
                avatars: defs,
                error,
            } => self.apply_join(success, player_id, players, defs, error, session, avatars),
            ServerMsg::PlayerJoined { player, avatar } => {
                self.apply_player_joined(player, avatar, session, avatars)
            }
            ServerMsg::PlayersMoved { players } => self.apply_players_moved(players, session),
            ServerMsg::PlayerLeft { player_id } => self.apply_player_left(&player_id, session),
            ServerMsg::Unknown => {
                debug!("Ignoring unrecognized action");
                ApplyOutcome::default()
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_join(
        &self,
        success: bool,
        player_id: Option<String>,
        players: HashMap<String, PlayerRecord>,
        defs: HashMap<String, AvatarDef>,
        error: Option<String>,
        session: &mut SessionState,
        avatars: &mut AvatarSet,
    ) -> ApplyOutcome {
        if !success {
            warn!(
                reason = %error.as_deref().unwrap_or("unspecified"),
                "Join rejected"
            );
            return ApplyOutcome::default();
        }
        let Some(local_id) = player_id else {
            warn!("Join response missing playerId; staying unjoined");
            return ApplyOutcome::default();
        };

        avatars.clear();
        for (name, def) in &defs {
            avatars.register(name, def);
        }
        session.adopt_snapshot(local_id.clone(), &players);
        session.set_phase(ConnectionPhase::Joined);
        info!(
            player_id = %local_id,
            players = session.player_count(),
            avatars = avatars.len(),
            "Joined session"
        );

        ApplyOutcome {
            state_changed: true,
            local_moved: session.local_player().is_some(),
        }
    }

    fn apply_player_joined(
        &self,
        player: PlayerRecord,
        avatar: Option<AvatarDef>,
        session: &mut SessionState,
        avatars: &mut AvatarSet,
    ) -> ApplyOutcome {
        if player.id.is_empty() {
            warn!("player_joined without an id; ignoring");
            return ApplyOutcome::default();
        }

        if let Some(def) = &avatar {
            let name = if def.name.is_empty() {
                player.avatar.as_str()
            } else {
                def.name.as_str()
            };
            if !avatars.contains(name) {
                avatars.register(name, def);
            }
        }

        let id = player.id.clone();
        session.upsert(&id, &player);
        info!(player_id = %id, "Player joined");

        ApplyOutcome {
            state_changed: true,
            local_moved: false,
        }
    }

    fn apply_players_moved(
        &self,
        players: HashMap<String, PlayerRecord>,
        session: &mut SessionState,
    ) -> ApplyOutcome {
        let mut local_moved = false;
        for (id, record) in &players {
            session.upsert(id, record);
            if session.is_local(id) {
                local_moved = true;
            }
        }
        ApplyOutcome {
            state_changed: !players.is_empty(),
            local_moved,
        }
    }

    fn apply_player_left(&self, player_id: &str, session: &mut SessionState) -> ApplyOutcome {
        let removed = session.remove(player_id);
        if removed {
            info!(player_id = %player_id, "Player left");
        } else {
            debug!(player_id = %player_id, "player_left for unknown player");
        }
        ApplyOutcome {
            state_changed: removed,
            local_moved: false,
        }
    }
}
