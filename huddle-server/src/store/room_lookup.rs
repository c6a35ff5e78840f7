use crate::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use huddle_core::{Room, RoomId};
use std::sync::atomic::{AtomicI64, Ordering};

#[async_trait]
pub trait RoomLookup: Send + Sync {
    /// Returns the room for `slug`, creating it on first use.
    async fn get_or_create(&self, slug: &str) -> Result<Room, StoreError>;
}

#[derive(Debug)]
pub struct InMemoryRoomLookup {
    rooms: DashMap<String, Room>,
    next_id: AtomicI64,
}

impl Default for InMemoryRoomLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomLookup {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl RoomLookup for InMemoryRoomLookup {
    async fn get_or_create(&self, slug: &str) -> Result<Room, StoreError> {
        let slug = Room::validate_slug(slug)?;

        let room = self
            .rooms
            .entry(slug.to_owned())
            .or_insert_with(|| Room {
                id: RoomId(self.next_id.fetch_add(1, Ordering::Relaxed)),
                slug: slug.to_owned(),
            })
            .clone();
        Ok(room)
    }
}
