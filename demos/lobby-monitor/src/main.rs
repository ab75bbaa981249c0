//! Connects to a lobby server and logs every roster and room change.
//!
//! ```text
//! lobby-monitor <host:port> [config.json]
//! ```
//!
//! Set `RUST_LOG=debug` to also see the synchronizer's own events.

use lobbysync::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Change descriptions
// ---------------------------------------------------------------------------

/// One human-readable line for a message, or `None` if it isn't worth
/// logging. Runs after the session has applied the message.
fn describe(message: &ServerMessage, state: &SessionState) -> Option<String> {
    let text = match message {
        ServerMessage::Welcome(w) => format!(
            "server {} says hello: {} players, {} watching",
            w.version, w.player_count, w.observer_count
        ),
        ServerMessage::LoginSuccess { name, uid } => format!("logged in as {name} (uid {uid})"),
        ServerMessage::PlayerList(players) => format!("{} players online", players.len()),
        ServerMessage::PlayerNew(p) => format!("+ {p}"),
        ServerMessage::PlayerLogout { uid } => format!("- uid {uid}"),
        ServerMessage::PlayerUpdate(p) if p.uid == state.my_uid() => match state.current_room_info() {
            Some(room) => format!("you are in {} ({}/{})", room.name, room.seated_count, room.max_players),
            None => "you are in the lobby".to_string(),
        },
        ServerMessage::RoomList(rooms) => format!("{} rooms open", rooms.len()),
        ServerMessage::RoomCreate(r) => format!("room #{} \"{}\" opened", r.room_id, r.name),
        ServerMessage::RoomDelete { room_id } => format!("room #{room_id} closed"),
        ServerMessage::ChangeStatus { uid, change } => {
            let who = state
                .player_by_uid(*uid)
                .map_or_else(|| format!("uid {uid}"), |p| p.name.clone());
            match change {
                SeatingChange::WatchOnly => format!("{who} is watching"),
                SeatingChange::JoinQueue(q) => format!("{who} queued at {q}"),
                SeatingChange::JoinSeat(s) => format!("{who} sat in seat {s}"),
                SeatingChange::Other(_) => return None,
            }
        }
        _ => return None,
    };
    Some(text)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lobbysync=warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:9200".to_string());
    let config = match args.next() {
        Some(path) => ClientConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ClientConfig::default().with_name("monitor"),
    };

    let mut client = Client::connect(addr.as_str(), config).await?;
    client.add_listener(|message: &ServerMessage, _: &str, state: &SessionState| {
        if let Some(text) = describe(message, state) {
            tracing::info!(target: "lobby", "{text}");
        }
    });

    client.run().await?;

    let session = client.session();
    tracing::info!(
        players = session.players().len(),
        rooms = session.rooms().len(),
        "disconnected"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_alice_seated() -> SessionState {
        let mut state = SessionState::new();
        state.set_identity("Alice", 7);
        state.apply_room_upsert(RoomInfo::new(2, "Fast", 2));
        state.apply_player_upsert(PlayerInfo {
            room_id: 2,
            seat_id: 0,
            ..PlayerInfo::new(7, "Alice")
        });
        state
    }

    #[test]
    fn test_describe_seat_change_uses_player_name() {
        let state = state_with_alice_seated();
        let msg = ServerMessage::parse("changestatus\tjoinseat\t0\t7\t0\t1").unwrap();
        assert_eq!(describe(&msg, &state).unwrap(), "Alice sat in seat 1");
    }

    #[test]
    fn test_describe_own_update_reports_room() {
        let state = state_with_alice_seated();
        let msg = ServerMessage::parse("playerupdate\t7;Alice;;;2;0;-1").unwrap();
        assert_eq!(describe(&msg, &state).unwrap(), "you are in Fast (0/2)");
    }

    #[test]
    fn test_describe_skips_unknown_messages() {
        let state = SessionState::new();
        let msg = ServerMessage::parse("lobbychat\thi").unwrap();
        assert!(describe(&msg, &state).is_none());
    }
}
