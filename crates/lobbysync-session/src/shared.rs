//! A cloneable handle to one [`SessionState`] behind a read-write lock.
//!
//! The dispatcher is the only writer. Readers (a UI thread, a listener)
//! take short read locks and get owned copies back, so no guard ever
//! escapes this module.

use std::sync::Arc;

use lobbysync_protocol::{PlayerInfo, RoomInfo};
use parking_lot::RwLock;

use crate::{Population, SessionState};

/// Shared access to the session.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing state.
    pub fn from_state(state: SessionState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Runs `f` with a read lock held.
    ///
    /// Keep `f` short: the dispatcher blocks on the write lock while it runs.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.inner.read();
        f(&*guard)
    }

    /// Runs `f` with the write lock held.
    pub fn write<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }

    /// A full copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    pub fn my_uid(&self) -> i32 {
        self.read(SessionState::my_uid)
    }

    pub fn my_info(&self) -> Option<PlayerInfo> {
        self.read(|s| s.my_info().cloned())
    }

    pub fn current_room_id(&self) -> i32 {
        self.read(SessionState::current_room_id)
    }

    pub fn current_room_info(&self) -> Option<RoomInfo> {
        self.read(|s| s.current_room_info().cloned())
    }

    pub fn player_by_uid(&self, uid: i32) -> Option<PlayerInfo> {
        self.read(|s| s.player_by_uid(uid).cloned())
    }

    pub fn player_by_name(&self, name: &str) -> Option<PlayerInfo> {
        self.read(|s| s.player_by_name(name).cloned())
    }

    pub fn room_by_id(&self, room_id: i32) -> Option<RoomInfo> {
        self.read(|s| s.room_by_id(room_id).cloned())
    }

    pub fn players(&self) -> Vec<PlayerInfo> {
        self.read(|s| s.players().to_vec())
    }

    pub fn rooms(&self) -> Vec<RoomInfo> {
        self.read(|s| s.rooms().to_vec())
    }

    pub fn players_in_room(&self, room_id: i32) -> Vec<PlayerInfo> {
        self.read(|s| s.players_in_room(room_id).cloned().collect())
    }

    pub fn population(&self) -> Population {
        self.read(SessionState::population)
    }

    /// Drops all state. See [`SessionState::clear`].
    pub fn clear(&self) {
        self.write(SessionState::clear);
    }
}
