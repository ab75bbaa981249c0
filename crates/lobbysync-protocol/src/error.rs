//! Error types for the protocol layer.
//!
//! Each crate in LobbySync defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in one inbound line or one
//! packed blob, never in the connection itself.

/// Errors that can occur while decoding lines and blobs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line is empty, or lacks a field its message type requires.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A field that must be an integer isn't one.
    ///
    /// Kept apart from `MalformedMessage` so logs can name the field,
    /// but callers treat both the same way (see [`is_malformed`]).
    ///
    /// [`is_malformed`]: ProtocolError::is_malformed
    #[error("field `{field}` is not a valid integer: {value:?}")]
    InvalidInteger {
        field: &'static str,
        value: String,
    },

    /// A packed blob could not be inflated or wasn't valid text.
    #[error("compression failed: {0}")]
    Compression(String),
}

impl ProtocolError {
    /// Returns `true` for errors that mean "this one line is bad".
    ///
    /// The contract for such errors is skip-and-continue: discard the
    /// line, keep the session.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedMessage(_) | Self::InvalidInteger { .. }
        )
    }
}
