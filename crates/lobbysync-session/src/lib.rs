//! Client-side lobby state for LobbySync.
//!
//! This crate holds the client's view of server-authoritative state:
//!
//! 1. **Roster**: every connected player, keyed by uid
//! 2. **Rooms**: every open room, keyed by room id
//! 3. **Identity**: which of those players is us
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)  ← decodes lines, calls the mutation API
//!     ↕
//! Session Layer (this crate)  ← owns players, rooms, identity
//!     ↕
//! Protocol Layer (below)  ← provides PlayerInfo, RoomInfo, SeatingChange
//! ```
//!
//! [`SessionState`] is a plain single-owner value. [`SharedSession`]
//! puts it behind one lock for readers on other threads (a UI, say).

mod keyed;
mod shared;
mod state;

pub use keyed::{Keyed, KeyedList, Upsert};
pub use shared::SharedSession;
pub use state::{Population, SessionState};
