//! Wire types: the player and room records nested inside lines.
//!
//! Both records travel as a single top-level field whose own fields are
//! joined by [`SUBFIELD_DELIMITER`]. Text subfields are escaped with
//! [`encode_text`], so neither `;` nor a tab can appear inside them.
//!
//! The leading subfields are required; trailing ones fall back to their
//! defaults when absent, and subfields past the last known one are
//! ignored. That lets an older client read a newer server's records.

use std::fmt;

use crate::codec::{SUBFIELD_DELIMITER, decode_text, encode_text, parse_int};
use crate::ProtocolError;

/// `room_id` of a player who isn't in any room.
pub const NO_ROOM: i32 = -1;

/// `seat_id` of a player who is spectating.
pub const NO_SEAT: i32 = -1;

/// `queue_id` of a player who isn't waiting for a seat.
pub const NO_QUEUE: i32 = -1;

// ---------------------------------------------------------------------------
// PlayerInfo
// ---------------------------------------------------------------------------

/// One connected player, as the server describes them.
///
/// Identity is the `uid` alone: two records with the same `uid` describe
/// the same player, and the later one wins wholesale.
///
/// Wire layout (`;`-joined):
///
/// ```text
/// uid;name;country;host;roomID;seatID;queueID[;ready[;playing[;team]]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Server-assigned identifier, unique for the life of a connection.
    pub uid: i32,
    /// Display name.
    pub name: String,
    /// Country code the client reported at login.
    pub country: String,
    /// Host name as the server sees it (often masked).
    pub host: String,
    /// Room the player is in, or [`NO_ROOM`].
    pub room_id: i32,
    /// Seat in that room, or [`NO_SEAT`].
    pub seat_id: i32,
    /// Position in the seat queue, or [`NO_QUEUE`].
    pub queue_id: i32,
    /// Whether the player pressed "ready".
    pub ready: bool,
    /// Whether the player is in a running game.
    pub playing: bool,
    /// Team name, empty if none.
    pub team: String,
}

impl PlayerInfo {
    /// Number of subfields that must be present.
    const REQUIRED_FIELDS: usize = 7;

    /// Creates a player in the lobby: no room, no seat, no queue.
    pub fn new(uid: i32, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            country: String::new(),
            host: String::new(),
            room_id: NO_ROOM,
            seat_id: NO_SEAT,
            queue_id: NO_QUEUE,
            ready: false,
            playing: false,
            team: String::new(),
        }
    }

    /// Decodes a player record from its sub-encoded field.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedMessage`] if a required subfield is
    /// missing, [`ProtocolError::InvalidInteger`] if a numeric one
    /// doesn't parse.
    pub fn parse(entry: &str) -> Result<Self, ProtocolError> {
        let f: Vec<&str> = entry.split(SUBFIELD_DELIMITER).collect();
        require(&f, Self::REQUIRED_FIELDS, "player")?;

        Ok(Self {
            uid: parse_int("uid", f[0])?,
            name: decode_text(f[1]),
            country: decode_text(f[2]),
            host: decode_text(f[3]),
            room_id: parse_int("roomID", f[4])?,
            seat_id: parse_int("seatID", f[5])?,
            queue_id: parse_int("queueID", f[6])?,
            ready: f.get(7).is_some_and(|v| parse_flag(v)),
            playing: f.get(8).is_some_and(|v| parse_flag(v)),
            team: f.get(9).map(|v| decode_text(v)).unwrap_or_default(),
        })
    }

    /// Reads only the `uid` of a sub-encoded player record.
    ///
    /// Logout messages carry a full record, but only its key matters.
    pub fn parse_uid(entry: &str) -> Result<i32, ProtocolError> {
        let uid = entry.split(SUBFIELD_DELIMITER).next().unwrap_or_default();
        parse_int("uid", uid)
    }

    /// Encodes this record as one sub-encoded field.
    pub fn to_wire(&self) -> String {
        [
            self.uid.to_string(),
            encode_text(&self.name),
            encode_text(&self.country),
            encode_text(&self.host),
            self.room_id.to_string(),
            self.seat_id.to_string(),
            self.queue_id.to_string(),
            self.ready.to_string(),
            self.playing.to_string(),
            encode_text(&self.team),
        ]
        .join(";")
    }

    /// Returns `true` if the player is in a room.
    pub fn in_room(&self) -> bool {
        self.room_id != NO_ROOM
    }

    /// Returns `true` if the player holds a seat.
    pub fn is_seated(&self) -> bool {
        self.seat_id != NO_SEAT
    }

    /// Returns `true` if the player is waiting in the seat queue.
    pub fn is_queued(&self) -> bool {
        self.queue_id != NO_QUEUE
    }
}

impl fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (uid {})", self.name, self.uid)
    }
}

// ---------------------------------------------------------------------------
// RoomInfo
// ---------------------------------------------------------------------------

/// One multiplayer room, as the server describes it.
///
/// Wire layout (`;`-joined):
///
/// ```text
/// roomID;name;maxPlayers;seatedCount;spectatorCount[;playing[;ruleLock[;ruleName[;modeName]]]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// Room identifier. Never negative for a real room.
    pub room_id: i32,
    /// Room title.
    pub name: String,
    /// Number of seats.
    pub max_players: i32,
    /// Seats currently taken.
    pub seated_count: i32,
    /// Players watching without a seat.
    pub spectator_count: i32,
    /// Whether a game is running.
    pub playing: bool,
    /// Whether every seat must use the room's rule.
    pub rule_lock: bool,
    /// The locked rule, if any.
    pub rule_name: String,
    /// Game mode played in the room.
    pub mode_name: String,
}

impl RoomInfo {
    const REQUIRED_FIELDS: usize = 5;

    /// Creates an empty room with the given id, title and seat count.
    pub fn new(room_id: i32, name: impl Into<String>, max_players: i32) -> Self {
        Self {
            room_id,
            name: name.into(),
            max_players,
            seated_count: 0,
            spectator_count: 0,
            playing: false,
            rule_lock: false,
            rule_name: String::new(),
            mode_name: String::new(),
        }
    }

    /// Decodes a room record from its sub-encoded field.
    ///
    /// # Errors
    /// Same as [`PlayerInfo::parse`].
    pub fn parse(entry: &str) -> Result<Self, ProtocolError> {
        let f: Vec<&str> = entry.split(SUBFIELD_DELIMITER).collect();
        require(&f, Self::REQUIRED_FIELDS, "room")?;

        Ok(Self {
            room_id: parse_int("roomID", f[0])?,
            name: decode_text(f[1]),
            max_players: parse_int("maxPlayers", f[2])?,
            seated_count: parse_int("seatedCount", f[3])?,
            spectator_count: parse_int("spectatorCount", f[4])?,
            playing: f.get(5).is_some_and(|v| parse_flag(v)),
            rule_lock: f.get(6).is_some_and(|v| parse_flag(v)),
            rule_name: f.get(7).map(|v| decode_text(v)).unwrap_or_default(),
            mode_name: f.get(8).map(|v| decode_text(v)).unwrap_or_default(),
        })
    }

    /// Reads only the `room_id` of a sub-encoded room record.
    pub fn parse_room_id(entry: &str) -> Result<i32, ProtocolError> {
        let id = entry.split(SUBFIELD_DELIMITER).next().unwrap_or_default();
        parse_int("roomID", id)
    }

    /// Encodes this record as one sub-encoded field.
    pub fn to_wire(&self) -> String {
        [
            self.room_id.to_string(),
            encode_text(&self.name),
            self.max_players.to_string(),
            self.seated_count.to_string(),
            self.spectator_count.to_string(),
            self.playing.to_string(),
            self.rule_lock.to_string(),
            encode_text(&self.rule_name),
            encode_text(&self.mode_name),
        ]
        .join(";")
    }

    /// Returns `true` if every seat is taken.
    pub fn is_full(&self) -> bool {
        self.seated_count >= self.max_players
    }
}

impl fmt::Display for RoomInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (room {})", self.name, self.room_id)
    }
}

// ---------------------------------------------------------------------------
// SeatingChange
// ---------------------------------------------------------------------------

/// A change to one player's seat/queue position in their room.
///
/// Seat and queue are mutually exclusive: every known variant clears at
/// least one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatingChange {
    /// Spectate: no seat, no queue.
    WatchOnly,
    /// Wait for a seat at the given queue position.
    JoinQueue(i32),
    /// Take the given seat.
    JoinSeat(i32),
    /// A status this client doesn't know. Carried, never applied.
    Other(String),
}

impl SeatingChange {
    /// The wire name of this status.
    pub fn kind(&self) -> &str {
        match self {
            Self::WatchOnly => "watchonly",
            Self::JoinQueue(_) => "joinqueue",
            Self::JoinSeat(_) => "joinseat",
            Self::Other(kind) => kind.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require(
    fields: &[&str],
    count: usize,
    what: &str,
) -> Result<(), ProtocolError> {
    if fields.len() < count {
        return Err(ProtocolError::MalformedMessage(format!(
            "{what} record has {} subfields, need {count}",
            fields.len()
        )));
    }
    Ok(())
}

/// Anything but a case-insensitive "true" reads as `false`.
fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
