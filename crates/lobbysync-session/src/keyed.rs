//! An insertion-ordered list with O(1) lookup by key.
//!
//! The server's roster and room list are ordered (the UI shows them in
//! the order the server announced them) and keyed (every delta names
//! its target by id). `KeyedList` keeps both: a `Vec` for order and a
//! `HashMap` from key to position.

use std::collections::HashMap;
use std::hash::Hash;

use lobbysync_protocol::{PlayerInfo, RoomInfo};

/// A value with an identity key.
pub trait Keyed {
    type Key: Copy + Eq + Hash;

    fn key(&self) -> Self::Key;
}

impl Keyed for PlayerInfo {
    type Key = i32;

    fn key(&self) -> i32 {
        self.uid
    }
}

impl Keyed for RoomInfo {
    type Key = i32;

    fn key(&self) -> i32 {
        self.room_id
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No entry had this key; the value was appended.
    Inserted,
    /// An entry had this key; it was replaced in place.
    Replaced,
}

/// Insertion-ordered values, at most one per key.
#[derive(Debug, Clone)]
pub struct KeyedList<T: Keyed> {
    entries: Vec<T>,
    /// Position of each key in `entries`. Kept in sync on every mutation.
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> KeyedList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Replaces the entry with the same key, or appends.
    pub fn upsert(&mut self, value: T) -> Upsert {
        match self.index.get(&value.key()) {
            Some(&pos) => {
                self.entries[pos] = value;
                Upsert::Replaced
            }
            None => {
                self.index.insert(value.key(), self.entries.len());
                self.entries.push(value);
                Upsert::Inserted
            }
        }
    }

    /// Removes the entry with this key. Later entries keep their order.
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let pos = self.index.remove(&key)?;
        let removed = self.entries.remove(pos);
        for later in &self.entries[pos..] {
            if let Some(p) = self.index.get_mut(&later.key()) {
                *p -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.index.get(&key).map(|&pos| &self.entries[pos])
    }

    /// Mutable access for in-place field changes that keep the key.
    pub(crate) fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.index.get(&key).map(|&pos| &mut self.entries[pos])
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.index.contains_key(&key)
    }

    /// First entry, in order, matching `pred`.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.entries.iter().find(|v| pred(v))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<T: Keyed> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a KeyedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
