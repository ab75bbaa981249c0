//! Unified error type for LobbySync.

use lobbysync_protocol::ProtocolError;
use lobbysync_records::RecordError;
use lobbysync_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum LobbySyncError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line or blob that didn't decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A personal-best record that didn't load.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Client configuration that didn't deserialize.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
