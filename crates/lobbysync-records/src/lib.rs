//! Personal-best records for LobbySync.
//!
//! A player's best result per (rule, mode, game type) lives in a
//! [`PersonalBestStore`]. Game modes ask the store whether a finished
//! run is a new record ([`PersonalBestStore::is_new_record`]) and then
//! register it ([`PersonalBestStore::register_record`]); which run is
//! "better" is decided by the [`RankingType`] the mode passes in.
//!
//! The store travels as a compact string (each record deflated and
//! base64-packed by the protocol codec) and persists into any
//! [`PropertyStore`] under `sppersonal.<player>.` keys.

mod error;
mod properties;
mod record;
mod store;

pub use error::RecordError;
pub use properties::{Properties, PropertyStore};
pub use record::{RankingType, RecordEntry, RecordKey, RecordStats};
pub use store::PersonalBestStore;
