//! Turns inbound lines into session mutations.
//!
//! The dispatcher is the only writer of the [`SharedSession`]. For each
//! line it:
//!
//! 1. Decodes a [`ServerMessage`] (or reports the line malformed)
//! 2. Applies it to the session and to its own connection state
//! 3. Notifies every listener, with the session already updated
//! 4. Returns the [`Command`]s the caller must carry out
//!
//! It performs no I/O. The caller owns the socket and the keepalive
//! timer; the dispatcher only says what to send and when to re-time.
//!
//! # Connection state
//!
//! ```text
//! Disconnected ──on_connected──→ AwaitingWelcome ──welcome──→ AwaitingLogin
//!                                                                   │
//!                                                             loginsuccess
//!                                                                   ▼
//!                                                                Active
//! ```
//!
//! Transitions are driven by message type, never by line count. Roster
//! and room deltas are applied in every state.

use std::time::Duration;

use lobbysync_protocol::{ClientMessage, ProtocolError, ServerMessage, Welcome};
use lobbysync_session::{SessionState, SharedSession};

use crate::ClientConfig;

/// Server keepalive requests below this are treated as absent.
const MIN_SERVER_KEEPALIVE_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the login handshake stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    AwaitingWelcome,
    AwaitingLogin,
    Active,
}

/// Something the caller must do on the dispatcher's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send this message to the server.
    Send(ClientMessage),
    /// Restart the keepalive timer with this interval.
    SetKeepalive(Duration),
}

/// Observes every decoded line after the session has been updated.
///
/// Unknown message types are delivered too, as
/// [`ServerMessage::Unknown`] with the raw line alongside.
pub trait MessageListener: Send {
    fn on_message(&mut self, message: &ServerMessage, line: &str, session: &SessionState);
}

impl<F> MessageListener for F
where
    F: FnMut(&ServerMessage, &str, &SessionState) + Send,
{
    fn on_message(&mut self, message: &ServerMessage, line: &str, session: &SessionState) {
        self(message, line, session)
    }
}

// ---------------------------------------------------------------------------
// ProtocolDispatcher
// ---------------------------------------------------------------------------

/// Decodes inbound lines, drives the handshake, and updates the session.
pub struct ProtocolDispatcher {
    config: ClientConfig,
    state: ConnectionState,
    session: SharedSession,
    listeners: Vec<Box<dyn MessageListener>>,
}

impl ProtocolDispatcher {
    /// Creates a dispatcher with a fresh, empty session.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_session(config, SharedSession::new())
    }

    /// Creates a dispatcher that writes into an existing session handle.
    pub fn with_session(config: ClientConfig, session: SharedSession) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            session,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The session this dispatcher writes. Clone it to read from elsewhere.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn add_listener(&mut self, listener: impl MessageListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -- Lifecycle ------------------------------------------------------------

    /// The transport is up; expect a `welcome` next.
    pub fn on_connected(&mut self) {
        tracing::info!(from = ?self.state, "connected, awaiting welcome");
        self.state = ConnectionState::AwaitingWelcome;
    }

    /// The transport is gone. Session state is left as it was.
    pub fn on_disconnected(&mut self) {
        tracing::info!(from = ?self.state, "disconnected");
        self.state = ConnectionState::Disconnected;
    }

    /// Empties the session: players, rooms, identity, counters.
    ///
    /// Call this before reconnecting. Nothing else clears the session.
    pub fn reset(&mut self) {
        self.session.clear();
        tracing::debug!("session reset");
    }

    // -- Inbound --------------------------------------------------------------

    /// Processes one inbound line.
    ///
    /// # Errors
    /// Returns the decode error for a malformed line. The session and
    /// the connection state are untouched and no listener is called;
    /// the caller should skip the line and keep reading.
    pub fn handle_line(&mut self, line: &str) -> Result<Vec<Command>, ProtocolError> {
        let message = match ServerMessage::parse(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, line, "discarding malformed line");
                return Err(e);
            }
        };

        let commands = self.apply(&message);
        self.notify(&message, line);
        Ok(commands)
    }

    fn apply(&mut self, message: &ServerMessage) -> Vec<Command> {
        match message {
            ServerMessage::Welcome(welcome) => return self.on_welcome(welcome),
            ServerMessage::ObserverUpdate {
                player_count,
                observer_count,
            } => {
                self.session
                    .write(|s| s.set_population(*player_count, *observer_count));
            }
            ServerMessage::LoginSuccess { name, uid } => {
                self.session.write(|s| s.set_identity(name.clone(), *uid));
                self.state = ConnectionState::Active;
                tracing::info!(uid = *uid, "login accepted");
            }
            ServerMessage::PlayerList(players) => {
                self.session.write(|s| s.apply_player_list(players.iter().cloned()));
            }
            ServerMessage::PlayerUpdate(player) | ServerMessage::PlayerNew(player) => {
                self.session.write(|s| s.apply_player_upsert(player.clone()));
            }
            ServerMessage::PlayerLogout { uid } => {
                self.session.write(|s| s.apply_player_removal(*uid));
            }
            ServerMessage::RoomList(rooms) => {
                self.session.write(|s| s.apply_room_list(rooms.iter().cloned()));
            }
            ServerMessage::RoomUpdate(room) | ServerMessage::RoomCreate(room) => {
                self.session.write(|s| s.apply_room_upsert(room.clone()));
            }
            ServerMessage::RoomDelete { room_id } => {
                self.session.write(|s| s.apply_room_removal(*room_id));
            }
            ServerMessage::ChangeStatus { uid, change } => {
                self.session.write(|s| s.apply_seating_change(*uid, change));
            }
            ServerMessage::Unknown { kind } => {
                tracing::debug!(kind = %kind, "unhandled message type");
            }
        }
        Vec::new()
    }

    fn on_welcome(&mut self, welcome: &Welcome) -> Vec<Command> {
        if !matches!(
            self.state,
            ConnectionState::Disconnected | ConnectionState::AwaitingWelcome
        ) {
            tracing::debug!(state = ?self.state, "ignoring welcome after handshake");
            return Vec::new();
        }

        self.session
            .write(|s| s.set_population(welcome.player_count, welcome.observer_count));

        let mut commands = Vec::with_capacity(2);
        // Only a value that differs from ours counts as a request.
        match welcome.ping_interval_ms {
            Some(interval_ms) if interval_ms < MIN_SERVER_KEEPALIVE_MS => {
                tracing::warn!(interval_ms, "ignoring implausible keepalive interval");
            }
            Some(interval_ms) if interval_ms != self.config.ping_interval_ms => {
                tracing::debug!(interval_ms, "server requested keepalive interval");
                commands.push(Command::SetKeepalive(Duration::from_millis(interval_ms)));
            }
            _ => {}
        }
        commands.push(Command::Send(ClientMessage::Login {
            version: self.config.protocol_version,
            name: self.config.name.clone(),
            locale: self.config.locale.clone(),
            team: self.config.team.clone(),
        }));

        tracing::info!(
            server_version = %welcome.version,
            players = welcome.player_count,
            observers = welcome.observer_count,
            "welcome received, logging in"
        );
        self.state = ConnectionState::AwaitingLogin;
        commands
    }

    fn notify(&mut self, message: &ServerMessage, line: &str) {
        if self.listeners.is_empty() {
            return;
        }
        let listeners = &mut self.listeners;
        self.session.read(|state| {
            for listener in listeners.iter_mut() {
                listener.on_message(message, line, state);
            }
        });
    }
}

impl std::fmt::Debug for ProtocolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolDispatcher")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
