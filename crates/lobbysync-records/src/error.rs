//! Error types for the records layer.

use lobbysync_protocol::ProtocolError;

/// Errors that can occur while decoding or packing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// An exported record string doesn't have the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// A numeric field or packed blob failed to decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
