//! Line protocol for LobbySync.
//!
//! This crate defines the "language" the lobby server and the client speak:
//!
//! - **Codec** ([`split`], [`join`], [`encode_text`], [`compress`], ...):
//!   how one text line is cut into fields, how free text survives the
//!   trip, and how opaque blobs are packed for storage.
//! - **Types** ([`PlayerInfo`], [`RoomInfo`], [`SeatingChange`]): the
//!   records that travel inside those fields.
//! - **Messages** ([`ServerMessage`], [`ClientMessage`]): one typed value
//!   per line, in each direction.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and session
//! (the client's view of the lobby). It doesn't know about sockets or
//! about who is in which room. It only turns lines into values and back.
//!
//! ```text
//! Transport (lines) → Protocol (ServerMessage) → Session (players, rooms)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod message;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{
    FIELD_DELIMITER, SUBFIELD_DELIMITER, compress, decode_text, decompress,
    encode_text, join, parse_int, split,
};
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage, Welcome};
pub use types::{NO_QUEUE, NO_ROOM, NO_SEAT, PlayerInfo, RoomInfo, SeatingChange};
