//! Transport layer for LobbySync.
//!
//! The lobby protocol is newline-framed text over a reliable stream.
//! [`LineConnection`] is the seam the client runs against: one line out,
//! one line in. [`TcpLineConnection`] is the real implementation;
//! tests substitute their own.
//!
//! [`PingTask`] is the keepalive timer. It doesn't touch the connection
//! itself, it enqueues the ping line on the client's outbound channel.

#![allow(async_fn_in_trait)]

mod error;
mod ping;
mod tcp;

pub use error::TransportError;
pub use ping::PingTask;
pub use tcp::TcpLineConnection;

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection that carries whole text lines.
///
/// Lines cross this boundary without their terminator: `send_line`
/// appends `\n`, `recv_line` strips `\n` and a preceding `\r`.
pub trait LineConnection: Send + Sync + 'static {
    /// Sends one line.
    async fn send_line(&self, line: &str) -> Result<(), TransportError>;

    /// Receives the next line.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream. Must be
    /// cancel-safe: a call dropped mid-line loses no bytes.
    async fn recv_line(&self) -> Result<Option<String>, TransportError>;

    /// Closes the sending half.
    async fn close(&self) -> Result<(), TransportError>;

    fn id(&self) -> ConnectionId;
}
