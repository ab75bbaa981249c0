//! The client's view of the lobby.
//!
//! Every mutation here is a whole-record operation: an upsert replaces
//! the stored record with the one the server sent, a removal drops it.
//! The only field-level change is [`SessionState::apply_seating_change`],
//! because `changestatus` names a player but doesn't resend them.

use lobbysync_protocol::{NO_QUEUE, NO_ROOM, NO_SEAT, PlayerInfo, RoomInfo, SeatingChange};

use crate::{KeyedList, Upsert};

/// Player and observer counts the server last announced.
///
/// `-1` means "not announced yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population {
    pub players: i32,
    pub observers: i32,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            players: -1,
            observers: -1,
        }
    }
}

/// Players, rooms, and our own identity, as last told by the server.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    players: KeyedList<PlayerInfo>,
    rooms: KeyedList<RoomInfo>,
    /// Our uid. 0 until login succeeds.
    my_uid: i32,
    /// Our display name, as the server confirmed it.
    my_name: String,
    population: Population,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything: players, rooms, identity, counters.
    ///
    /// Nothing calls this automatically. A client that reconnects must
    /// reset explicitly before the new server's snapshot arrives.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // -- Identity -------------------------------------------------------------

    /// Records who we are after a successful login.
    pub fn set_identity(&mut self, name: impl Into<String>, uid: i32) {
        self.my_name = name.into();
        self.my_uid = uid;
        tracing::info!(uid, name = %self.my_name, "identity assigned");
    }

    pub fn my_uid(&self) -> i32 {
        self.my_uid
    }

    pub fn my_name(&self) -> &str {
        &self.my_name
    }

    /// Our own player record, found the same way as anyone else's.
    pub fn my_info(&self) -> Option<&PlayerInfo> {
        self.player_by_uid(self.my_uid)
    }

    /// The room we're in, or [`NO_ROOM`] if we aren't in one or the
    /// server hasn't listed us yet.
    pub fn current_room_id(&self) -> i32 {
        self.my_info().map_or(NO_ROOM, |me| me.room_id)
    }

    /// The room we're in, if it's known.
    pub fn current_room_info(&self) -> Option<&RoomInfo> {
        self.room_by_id(self.current_room_id())
    }

    // -- Population -----------------------------------------------------------

    pub fn population(&self) -> Population {
        self.population
    }

    pub fn set_population(&mut self, players: i32, observers: i32) {
        self.population = Population { players, observers };
    }

    // -- Players --------------------------------------------------------------

    /// Applies a roster snapshot.
    ///
    /// Each entry is upserted, so a snapshot that repeats a uid (or
    /// overlaps players we already know) still leaves one record per uid.
    pub fn apply_player_list(&mut self, entries: impl IntoIterator<Item = PlayerInfo>) {
        for entry in entries {
            self.players.upsert(entry);
        }
        tracing::debug!(players = self.players.len(), "player list applied");
    }

    /// Inserts a new player or replaces the one with the same uid.
    pub fn apply_player_upsert(&mut self, entry: PlayerInfo) -> Upsert {
        let uid = entry.uid;
        let outcome = self.players.upsert(entry);
        tracing::debug!(uid, ?outcome, "player upserted");
        outcome
    }

    /// Removes the player with this uid. Absent uid is a no-op.
    pub fn apply_player_removal(&mut self, uid: i32) -> Option<PlayerInfo> {
        let removed = self.players.remove(uid);
        if removed.is_some() {
            tracing::debug!(uid, "player removed");
        }
        removed
    }

    /// Moves a player between seat, queue, and spectating.
    ///
    /// Returns `true` if a player was changed. Unknown players and
    /// unknown statuses change nothing.
    pub fn apply_seating_change(&mut self, uid: i32, change: &SeatingChange) -> bool {
        let Some(player) = self.players.get_mut(uid) else {
            return false;
        };
        let (seat, queue) = match *change {
            SeatingChange::WatchOnly => (NO_SEAT, NO_QUEUE),
            SeatingChange::JoinQueue(queue) => (NO_SEAT, queue),
            SeatingChange::JoinSeat(seat) => (seat, NO_QUEUE),
            SeatingChange::Other(ref kind) => {
                tracing::debug!(uid, kind = %kind, "unknown seating status ignored");
                return false;
            }
        };
        player.seat_id = seat;
        player.queue_id = queue;
        true
    }

    pub fn player_by_uid(&self, uid: i32) -> Option<&PlayerInfo> {
        self.players.get(uid)
    }

    /// First player, in roster order, with this exact name.
    pub fn player_by_name(&self, name: &str) -> Option<&PlayerInfo> {
        self.players.find(|p| p.name == name)
    }

    /// Players in a room, in roster order.
    pub fn players_in_room(&self, room_id: i32) -> impl Iterator<Item = &PlayerInfo> {
        self.players.iter().filter(move |p| p.room_id == room_id)
    }

    pub fn players(&self) -> &[PlayerInfo] {
        self.players.as_slice()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // -- Rooms ----------------------------------------------------------------

    /// Applies a room snapshot. Same upsert rule as players.
    pub fn apply_room_list(&mut self, entries: impl IntoIterator<Item = RoomInfo>) {
        for entry in entries {
            self.rooms.upsert(entry);
        }
        tracing::debug!(rooms = self.rooms.len(), "room list applied");
    }

    /// Inserts a new room or replaces the one with the same id.
    pub fn apply_room_upsert(&mut self, entry: RoomInfo) -> Upsert {
        let room_id = entry.room_id;
        let outcome = self.rooms.upsert(entry);
        tracing::debug!(room_id, ?outcome, "room upserted");
        outcome
    }

    /// Removes the room with this id. Absent id is a no-op.
    pub fn apply_room_removal(&mut self, room_id: i32) -> Option<RoomInfo> {
        let removed = self.rooms.remove(room_id);
        if removed.is_some() {
            tracing::debug!(room_id, "room removed");
        }
        removed
    }

    /// Looks up a room. Negative ids are never rooms.
    pub fn room_by_id(&self, room_id: i32) -> Option<&RoomInfo> {
        if room_id < 0 {
            return None;
        }
        self.rooms.get(room_id)
    }

    pub fn rooms(&self) -> &[RoomInfo] {
        self.rooms.as_slice()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
