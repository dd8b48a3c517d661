//! Process-wide index of rooms, seated players, and guest channels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gamehall_protocol::{ChannelId, PlayerId, RoomId};
use gamehall_session::{Guest, Player};
use rand::Rng;

use crate::Room;

/// Default length of generated room ids.
pub const DEFAULT_ROOM_ID_LEN: usize = 6;

/// The three indexes, always mutated together under one lock.
#[derive(Default)]
pub(crate) struct Index {
    pub(crate) rooms: HashMap<RoomId, Arc<Room>>,
    /// Only players currently seated in some room.
    pub(crate) players: HashMap<PlayerId, Arc<Player>>,
    /// Only guests currently watching some room.
    pub(crate) guests: HashMap<ChannelId, Arc<Guest>>,
}

impl Index {
    /// Picks a random numeric id no live room uses.
    fn allocate_id(&self, len: usize) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let id: String = (0..len)
                .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
                .collect();
            let id = RoomId(id);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Tracks every live room and who sits where.
///
/// The registry is read freely, but only room lifecycle operations write
/// to it. That keeps "player is indexed" and "player is seated" in
/// lockstep: a player appears here exactly while some room seats them.
///
/// Lock order is registry, then room, then player.
pub struct Registry {
    index: Mutex<Index>,
    id_len: usize,
}

impl Registry {
    /// Creates an empty registry generating 6-digit room ids.
    pub fn new() -> Arc<Self> {
        Self::with_id_len(DEFAULT_ROOM_ID_LEN)
    }

    /// Creates an empty registry generating `id_len`-digit room ids.
    pub fn with_id_len(id_len: usize) -> Arc<Self> {
        Arc::new(Self {
            index: Mutex::new(Index::default()),
            id_len: id_len.max(1),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn allocate_id(&self, index: &Index) -> RoomId {
        index.allocate_id(self.id_len)
    }

    // -- Lookups --

    /// Looks up a live room.
    pub fn room(&self, id: &RoomId) -> Option<Arc<Room>> {
        self.lock().rooms.get(id).cloned()
    }

    /// All live rooms, in no particular order.
    pub fn rooms(&self) -> Vec<Arc<Room>> {
        self.lock().rooms.values().cloned().collect()
    }

    /// Looks up a seated player.
    pub fn player(&self, id: PlayerId) -> Option<Arc<Player>> {
        self.lock().players.get(&id).cloned()
    }

    /// The room a player currently sits in.
    pub fn room_of(&self, id: PlayerId) -> Option<Arc<Room>> {
        let index = self.lock();
        let room = index.players.get(&id)?.room()?;
        index.rooms.get(&room).cloned()
    }

    /// Looks up a watching guest.
    pub fn guest(&self, channel: &ChannelId) -> Option<Arc<Guest>> {
        self.lock().guests.get(channel).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.lock().players.len()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.lock();
        f.debug_struct("Registry")
            .field("rooms", &index.rooms.len())
            .field("players", &index.players.len())
            .field("guests", &index.guests.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocated_ids_are_numeric_with_requested_length() {
        let index = Index::default();
        for _ in 0..50 {
            let id = index.allocate_id(6);
            assert_eq!(id.as_str().len(), 6);
            assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = Registry::new();
        assert_eq!(registry.room_count(), 0);
        assert_eq!(registry.player_count(), 0);
        assert!(registry.room(&RoomId::from("000000")).is_none());
    }
}
