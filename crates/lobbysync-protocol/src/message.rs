//! Typed messages: one value per line, in each direction.
//!
//! The first field of every line names its type. [`ServerMessage::parse`]
//! dispatches on that name and decodes the remaining fields; a name it
//! doesn't recognise becomes [`ServerMessage::Unknown`] rather than an
//! error, so a newer server can add message types without breaking us.

use crate::codec::{decode_text, encode_text, join, parse_int, split};
use crate::types::{PlayerInfo, RoomInfo, SeatingChange};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// The server's greeting, sent once right after the connection opens.
///
/// ```text
/// welcome  version  playerCount  observerCount  [minor]  [versionString]  [pingIntervalMs]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    /// Server protocol version, as sent. Not interpreted.
    pub version: String,
    pub player_count: i32,
    pub observer_count: i32,
    pub minor_version: Option<String>,
    pub version_string: Option<String>,
    /// Keepalive interval the server asks for, if it asks.
    pub ping_interval_ms: Option<u64>,
}

/// An inbound message, decoded from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `welcome`: see [`Welcome`].
    Welcome(Welcome),

    /// `observerupdate  playerCount  observerCount`
    ObserverUpdate {
        player_count: i32,
        observer_count: i32,
    },

    /// `loginsuccess  encodedName  uid`: the server accepted us and
    /// tells us who we are.
    LoginSuccess { name: String, uid: i32 },

    /// `playerlist  count  entry…`: full roster snapshot.
    PlayerList(Vec<PlayerInfo>),

    /// `playerupdate  entry`: a player's record changed.
    PlayerUpdate(PlayerInfo),

    /// `playernew  entry`: a player logged in.
    PlayerNew(PlayerInfo),

    /// `playerlogout  entry`: a player left. Only the uid matters.
    PlayerLogout { uid: i32 },

    /// `roomlist  count  entry…`: full room snapshot.
    RoomList(Vec<RoomInfo>),

    /// `roomupdate  entry`
    RoomUpdate(RoomInfo),

    /// `roomcreate  entry`
    RoomCreate(RoomInfo),

    /// `roomdelete  entry`: only the room id matters.
    RoomDelete { room_id: i32 },

    /// `changestatus  kind  _  uid  _  value`
    ChangeStatus { uid: i32, change: SeatingChange },

    /// Any message type this client doesn't handle.
    Unknown { kind: String },
}

impl ServerMessage {
    /// Decodes one inbound line.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedMessage`] for an empty line or a missing
    /// required field, [`ProtocolError::InvalidInteger`] for a numeric
    /// field that doesn't parse. An unrecognised type is NOT an error.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let fields = split(line)?;
        let kind = fields[0];
        let at = |index: usize, name: &'static str| {
            fields.get(index).copied().ok_or_else(|| {
                ProtocolError::MalformedMessage(format!(
                    "{kind}: missing field `{name}`"
                ))
            })
        };

        let message = match kind {
            "welcome" => Self::Welcome(Welcome {
                version: at(1, "version")?.to_string(),
                player_count: parse_int("playerCount", at(2, "playerCount")?)?,
                observer_count: parse_int(
                    "observerCount",
                    at(3, "observerCount")?,
                )?,
                minor_version: optional(&fields, 4).map(str::to_string),
                version_string: optional(&fields, 5).map(str::to_string),
                ping_interval_ms: optional(&fields, 6)
                    .map(|v| parse_int("pingInterval", v))
                    .transpose()?,
            }),
            "observerupdate" => Self::ObserverUpdate {
                player_count: parse_int("playerCount", at(1, "playerCount")?)?,
                observer_count: parse_int(
                    "observerCount",
                    at(2, "observerCount")?,
                )?,
            },
            "loginsuccess" => Self::LoginSuccess {
                name: decode_text(at(1, "name")?),
                uid: parse_int("uid", at(2, "uid")?)?,
            },
            "playerlist" => {
                let count: usize = parse_int("count", at(1, "count")?)?;
                let players = (0..count)
                    .map(|i| PlayerInfo::parse(at(2 + i, "entry")?))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::PlayerList(players)
            }
            "playerupdate" => {
                Self::PlayerUpdate(PlayerInfo::parse(at(1, "entry")?)?)
            }
            "playernew" => Self::PlayerNew(PlayerInfo::parse(at(1, "entry")?)?),
            "playerlogout" => Self::PlayerLogout {
                uid: PlayerInfo::parse_uid(at(1, "entry")?)?,
            },
            "roomlist" => {
                let count: usize = parse_int("count", at(1, "count")?)?;
                let rooms = (0..count)
                    .map(|i| RoomInfo::parse(at(2 + i, "entry")?))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::RoomList(rooms)
            }
            "roomupdate" => Self::RoomUpdate(RoomInfo::parse(at(1, "entry")?)?),
            "roomcreate" => Self::RoomCreate(RoomInfo::parse(at(1, "entry")?)?),
            "roomdelete" => Self::RoomDelete {
                room_id: RoomInfo::parse_room_id(at(1, "entry")?)?,
            },
            "changestatus" => {
                let status = at(1, "status")?;
                let uid = parse_int("uid", at(2, "uid")?)?;
                let change = match status {
                    "watchonly" => SeatingChange::WatchOnly,
                    "joinqueue" => SeatingChange::JoinQueue(parse_int(
                        "value",
                        at(4, "value")?,
                    )?),
                    "joinseat" => SeatingChange::JoinSeat(parse_int(
                        "value",
                        at(4, "value")?,
                    )?),
                    other => SeatingChange::Other(other.to_string()),
                };
                Self::ChangeStatus { uid, change }
            }
            other => Self::Unknown {
                kind: other.to_string(),
            },
        };
        Ok(message)
    }

    /// The wire name of this message's type.
    pub fn kind(&self) -> &str {
        match self {
            Self::Welcome(_) => "welcome",
            Self::ObserverUpdate { .. } => "observerupdate",
            Self::LoginSuccess { .. } => "loginsuccess",
            Self::PlayerList(_) => "playerlist",
            Self::PlayerUpdate(_) => "playerupdate",
            Self::PlayerNew(_) => "playernew",
            Self::PlayerLogout { .. } => "playerlogout",
            Self::RoomList(_) => "roomlist",
            Self::RoomUpdate(_) => "roomupdate",
            Self::RoomCreate(_) => "roomcreate",
            Self::RoomDelete { .. } => "roomdelete",
            Self::ChangeStatus { .. } => "changestatus",
            Self::Unknown { kind } => kind.as_str(),
        }
    }
}

/// A present, non-empty optional field.
fn optional<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields.get(index).copied().filter(|f| !f.is_empty())
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `login  clientVersion  encodedName  locale  encodedTeam`
    Login {
        version: u32,
        name: String,
        locale: String,
        team: String,
    },

    /// `ping`: keepalive.
    Ping,
}

impl ClientMessage {
    /// Renders this message as one line, without the terminator.
    pub fn to_line(&self) -> String {
        match self {
            Self::Login {
                version,
                name,
                locale,
                team,
            } => join(&[
                "login".to_string(),
                version.to_string(),
                encode_text(name),
                locale.clone(),
                encode_text(team),
            ]),
            Self::Ping => "ping".to_string(),
        }
    }
}
