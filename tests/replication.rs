//! Session replication driven by raw wire payloads.

use tokio::sync::mpsc;

use tileworld_client::assets::AssetLoader;
use tileworld_client::render::avatar::AvatarSet;
use tileworld_client::session::adapter::ProtocolAdapter;
use tileworld_client::session::state::{ConnectionPhase, SessionState};

fn fixture() -> (ProtocolAdapter, SessionState, AvatarSet) {
    let (out_tx, _out_rx) = mpsc::channel(8);
    let (event_tx, _event_rx) = mpsc::channel(8);
    (
        ProtocolAdapter::new("viewer".to_string(), out_tx),
        SessionState::new(),
        AvatarSet::new(AssetLoader::new("assets", event_tx)),
    )
}

#[test]
fn join_then_leave_empties_the_mapping() {
    tokio_test::block_on(async {
        let (adapter, mut session, mut avatars) = fixture();

        adapter.apply(
            r#"{"action": "join", "success": true, "playerId": "me",
                "players": {"p1": {"x": 100, "y": 100, "facing": "south",
                                   "avatar": "a1", "animationFrame": 0}}}"#,
            &mut session,
            &mut avatars,
        );
        assert_eq!(session.player_count(), 1);

        adapter.apply(
            r#"{"action": "player_left", "playerId": "p1"}"#,
            &mut session,
            &mut avatars,
        );
        assert_eq!(session.player_count(), 0);
    });
}

#[test]
fn fresh_join_replaces_the_previous_session() {
    tokio_test::block_on(async {
        let (adapter, mut session, mut avatars) = fixture();

        adapter.apply(
            r#"{"action": "join", "success": true, "playerId": "me",
                "players": {"old": {"x": 1, "y": 1, "avatar": "a1"}}}"#,
            &mut session,
            &mut avatars,
        );
        adapter.apply(
            r#"{"action": "join", "success": true, "playerId": "me2",
                "players": {"new": {"x": 2, "y": 2, "avatar": "a1"}}}"#,
            &mut session,
            &mut avatars,
        );

        assert_eq!(session.local_player_id(), Some("me2"));
        assert!(session.player("old").is_none());
        assert!(session.player("new").is_some());
    });
}

#[test]
fn disconnect_freezes_last_known_good_state() {
    tokio_test::block_on(async {
        let (adapter, mut session, mut avatars) = fixture();

        adapter.apply(
            r#"{"action": "join", "success": true, "playerId": "me",
                "players": {"me": {"x": 5, "y": 5, "avatar": "a1"},
                            "p2": {"x": 9, "y": 9, "avatar": "a1"}}}"#,
            &mut session,
            &mut avatars,
        );
        adapter.handle_close(&mut session);

        assert_eq!(session.phase(), ConnectionPhase::Disconnected);
        assert_eq!(session.player_count(), 2);
        assert_eq!(session.local_player().unwrap().x, 5.0);
    });
}
