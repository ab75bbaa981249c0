//! A single leaderboard record and the rules for ranking it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lobbysync_protocol::{decode_text, encode_text, parse_int};
use serde::{Deserialize, Serialize};

use crate::RecordError;

/// Separates the top-level fields of an exported record.
const FIELD_SEPARATOR: char = ';';

/// Separates the items of a list field (stats, custom stats).
const LIST_SEPARATOR: char = ',';

// ---------------------------------------------------------------------------
// RankingType
// ---------------------------------------------------------------------------

/// Selects which comparator defines "better" for a record.
///
/// Each variant compares stats lexicographically; the first stat that
/// differs decides. Directions per variant:
///
/// | Variant        | Order of keys                                          |
/// |----------------|--------------------------------------------------------|
/// | `GenericScore` | score ↓, lines ↓, time ↑                               |
/// | `GenericTime`  | rollclear ↓, time ↑, pieces ↑                          |
/// | `ScoreRace`    | rollclear ↓, time ↑, lines ↑, pieces ↑                 |
/// | `DigRace`      | garbage lines ↓, time ↑, pieces ↑                      |
/// | `ComboRace`    | max combo ↓, time ↑                                    |
/// | `DigChallenge` | garbage lines ↓, score ↓                               |
/// | `TimeAttack`   | rollclear ↓, lines ↓, time ↑                           |
///
/// (↓ = higher wins, ↑ = lower wins.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingType {
    GenericScore,
    GenericTime,
    ScoreRace,
    DigRace,
    ComboRace,
    DigChallenge,
    TimeAttack,
}

impl RankingType {
    /// All ranking types, in wire-id order.
    pub const ALL: [RankingType; 7] = [
        Self::GenericScore,
        Self::GenericTime,
        Self::ScoreRace,
        Self::DigRace,
        Self::ComboRace,
        Self::DigChallenge,
        Self::TimeAttack,
    ];

    /// The integer id used on the wire and by game modes.
    pub fn id(self) -> i32 {
        match self {
            Self::GenericScore => 0,
            Self::GenericTime => 1,
            Self::ScoreRace => 2,
            Self::DigRace => 3,
            Self::ComboRace => 4,
            Self::DigChallenge => 5,
            Self::TimeAttack => 6,
        }
    }

    /// Looks up a ranking type by wire id.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Projects stats onto a key where "greater" always means "better".
    fn rank_key(self, s: &RecordStats) -> [i64; 4] {
        let time = -i64::from(s.time);
        let pieces = -i64::from(s.pieces);
        match self {
            Self::GenericScore => [s.score, s.lines.into(), time, 0],
            Self::GenericTime => [s.rollclear.into(), time, pieces, 0],
            Self::ScoreRace => {
                [s.rollclear.into(), time, -i64::from(s.lines), pieces]
            }
            Self::DigRace => [s.garbage_lines.into(), time, pieces, 0],
            Self::ComboRace => [s.max_combo.into(), time, 0, 0],
            Self::DigChallenge => [s.garbage_lines.into(), s.score, 0, 0],
            Self::TimeAttack => [s.rollclear.into(), s.lines.into(), time, 0],
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStats
// ---------------------------------------------------------------------------

/// The numeric result of one run.
///
/// Times are in frames. `rollclear` is mode-defined: 0 for a run that
/// didn't reach the goal, higher values for better completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    pub score: i64,
    pub lines: i32,
    pub time: i32,
    pub pieces: i32,
    pub level: i32,
    pub rollclear: i32,
    pub garbage_lines: i32,
    pub max_combo: i32,
}

impl RecordStats {
    const FIELD_COUNT: usize = 8;

    fn export(&self) -> String {
        [
            self.score.to_string(),
            self.lines.to_string(),
            self.time.to_string(),
            self.pieces.to_string(),
            self.level.to_string(),
            self.rollclear.to_string(),
            self.garbage_lines.to_string(),
            self.max_combo.to_string(),
        ]
        .join(",")
    }

    fn import(s: &str) -> Result<Self, RecordError> {
        let f: Vec<&str> = s.split(LIST_SEPARATOR).collect();
        if f.len() < Self::FIELD_COUNT {
            return Err(RecordError::Malformed(format!(
                "stats have {} values, need {}",
                f.len(),
                Self::FIELD_COUNT
            )));
        }
        Ok(Self {
            score: parse_int("score", f[0])?,
            lines: parse_int("lines", f[1])?,
            time: parse_int("time", f[2])?,
            pieces: parse_int("pieces", f[3])?,
            level: parse_int("level", f[4])?,
            rollclear: parse_int("rollclear", f[5])?,
            garbage_lines: parse_int("garbageLines", f[6])?,
            max_combo: parse_int("maxCombo", f[7])?,
        })
    }
}

// ---------------------------------------------------------------------------
// RecordKey
// ---------------------------------------------------------------------------

/// The identity of a record within one player's store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub rule_name: String,
    pub mode_name: String,
    pub game_type: i32,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.rule_name, self.mode_name, self.game_type)
    }
}

// ---------------------------------------------------------------------------
// RecordEntry
// ---------------------------------------------------------------------------

/// One personal-best record.
///
/// The key (`rule_name`, `mode_name`, `game_type`) never changes once a
/// record is in a store; a better run replaces everything else.
///
/// Exported layout (`;`-joined, text fields escaped):
///
/// ```text
/// player;rule;mode;gameType;style;timestamp;stats[;customStats[;replay]]
/// ```
///
/// `stats` is eight `,`-joined integers; `customStats` is a count
/// followed by that many escaped items, so an empty item survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEntry {
    pub player_name: String,
    pub rule_name: String,
    pub mode_name: String,
    pub game_type: i32,
    pub style: i32,
    pub timestamp: String,
    pub stats: RecordStats,
    /// Mode-specific extra values, in the mode's own order.
    pub custom_stats: Vec<String>,
    /// Replay data, opaque to the store.
    pub replay: String,
}

impl RecordEntry {
    const REQUIRED_FIELDS: usize = 7;

    /// Creates a record for the given key with zeroed stats.
    pub fn new(
        rule_name: impl Into<String>,
        mode_name: impl Into<String>,
        game_type: i32,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            mode_name: mode_name.into(),
            game_type,
            ..Self::default()
        }
    }

    /// Sets the stats, builder-style.
    pub fn with_stats(mut self, stats: RecordStats) -> Self {
        self.stats = stats;
        self
    }

    /// Returns this record's key.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            rule_name: self.rule_name.clone(),
            mode_name: self.mode_name.clone(),
            game_type: self.game_type,
        }
    }

    /// Returns `true` if this record has the given key.
    pub fn matches(&self, rule: &str, mode: &str, game_type: i32) -> bool {
        self.rule_name == rule
            && self.mode_name == mode
            && self.game_type == game_type
    }

    /// Returns `true` iff `self` strictly outranks `other` under `ranking`.
    ///
    /// Equal results never outrank each other, so re-registering the
    /// same run is not a new record.
    pub fn compare(&self, ranking: RankingType, other: &RecordEntry) -> bool {
        ranking
            .rank_key(&self.stats)
            .cmp(&ranking.rank_key(&other.stats))
            == Ordering::Greater
    }

    /// Serializes this record into one line-safe string.
    pub fn export_string(&self) -> String {
        let mut custom = self.custom_stats.len().to_string();
        for item in &self.custom_stats {
            custom.push(LIST_SEPARATOR);
            custom.push_str(&encode_text(item));
        }

        [
            encode_text(&self.player_name),
            encode_text(&self.rule_name),
            encode_text(&self.mode_name),
            self.game_type.to_string(),
            self.style.to_string(),
            encode_text(&self.timestamp),
            self.stats.export(),
            custom,
            encode_text(&self.replay),
        ]
        .join(";")
    }

    /// Reverses [`export_string`](Self::export_string).
    ///
    /// # Errors
    /// [`RecordError::Malformed`] if required fields are missing,
    /// [`RecordError::Protocol`] if a number doesn't parse.
    pub fn import_string(s: &str) -> Result<Self, RecordError> {
        let f: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        if f.len() < Self::REQUIRED_FIELDS {
            return Err(RecordError::Malformed(format!(
                "record has {} fields, need {}",
                f.len(),
                Self::REQUIRED_FIELDS
            )));
        }

        Ok(Self {
            player_name: decode_text(f[0]),
            rule_name: decode_text(f[1]),
            mode_name: decode_text(f[2]),
            game_type: parse_int("gameType", f[3])?,
            style: parse_int("style", f[4])?,
            timestamp: decode_text(f[5]),
            stats: RecordStats::import(f[6])?,
            custom_stats: match f.get(7) {
                Some(list) => import_custom_stats(list)?,
                None => Vec::new(),
            },
            replay: f.get(8).map(|r| decode_text(r)).unwrap_or_default(),
        })
    }
}

impl FromStr for RecordEntry {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::import_string(s)
    }
}

fn import_custom_stats(list: &str) -> Result<Vec<String>, RecordError> {
    let mut items = list.split(LIST_SEPARATOR);
    let count: usize = parse_int("customCount", items.next().unwrap_or("0"))?;
    let values: Vec<String> = items.map(decode_text).collect();
    if values.len() != count {
        return Err(RecordError::Malformed(format!(
            "custom stats declare {count} items, found {}",
            values.len()
        )));
    }
    Ok(values)
}
