use dashmap::DashMap;
use huddle_core::{ConnectionId, Nickname, RoomId};

/// What the relay knows about one live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub nickname: Nickname,
    pub room: RoomId,
}

/// Single source of truth for "who is where".
///
/// Owned by whoever builds the relay and handed to it explicitly, so tests can
/// run any number of independent relays side by side.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert: a second registration for the same id replaces the first.
    pub fn register(&self, id: ConnectionId, nickname: Nickname, room: RoomId) {
        self.entries.insert(id, ConnectionEntry { nickname, room });
    }

    /// Returns `false` when the id is not registered.
    pub fn update_nickname(&self, id: &ConnectionId, nickname: Nickname) -> bool {
        match self.entries.get_mut(id) {
            Some(mut entry) => {
                entry.nickname = nickname;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        self.entries.remove(id).map(|(_, entry)| entry)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Ids whose entry points at `room`, collected so no shard lock outlives the call.
    pub fn connections_in(&self, room: RoomId) -> Vec<ConnectionId> {
        self.entries
            .iter()
            .filter(|entry| entry.value().room == room)
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
