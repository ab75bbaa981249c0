//! # LobbySync
//!
//! Client-side session synchronizer for lobby servers that speak a
//! tab-delimited line protocol.
//!
//! The server owns the truth: who is connected, which rooms exist, who
//! sits where. The client keeps a local copy by applying every delta
//! line in order. This crate wires the layers together:
//!
//! ```text
//! Transport (lines) → ProtocolDispatcher → SessionState → listeners
//!        ↑                    │
//!        └──── login, ping ───┘
//! ```
//!
//! Personal-best records ([`lobbysync_records`]) travel alongside and
//! are re-exported here.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lobbysync::prelude::*;
//!
//! # async fn start() -> Result<(), LobbySyncError> {
//! let config = ClientConfig::default().with_name("Alice").with_locale("JP");
//! let mut client = Client::connect("127.0.0.1:9200", config).await?;
//! let session = client.session();
//! client.add_listener(move |msg: &ServerMessage, _line: &str, _state: &SessionState| {
//!     tracing::info!(kind = msg.kind(), "lobby message");
//! });
//! client.run().await?;
//! # drop(session);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatcher;
mod error;

pub use client::Client;
pub use config::ClientConfig;
pub use dispatcher::{Command, ConnectionState, MessageListener, ProtocolDispatcher};
pub use error::LobbySyncError;

pub use lobbysync_protocol;
pub use lobbysync_records;
pub use lobbysync_session;
pub use lobbysync_transport;

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{
        Client, ClientConfig, Command, ConnectionState, LobbySyncError, MessageListener,
        ProtocolDispatcher,
    };
    pub use lobbysync_protocol::{
        ClientMessage, NO_QUEUE, NO_ROOM, NO_SEAT, PlayerInfo, ProtocolError, RoomInfo,
        SeatingChange, ServerMessage,
    };
    pub use lobbysync_records::{
        PersonalBestStore, Properties, PropertyStore, RankingType, RecordEntry, RecordError,
        RecordStats,
    };
    pub use lobbysync_session::{Population, SessionState, SharedSession};
    pub use lobbysync_transport::{LineConnection, TcpLineConnection, TransportError};
}
