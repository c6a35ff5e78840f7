use crate::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use huddle_core::{Nickname, RoomId, StoredMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Append/read collaborator for chat history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(
        &self,
        room: RoomId,
        nickname: Nickname,
        content: String,
        font_family: Option<String>,
    ) -> Result<StoredMessage, StoreError>;

    /// The newest `limit` messages of `room`, oldest first.
    async fn recent(&self, room: RoomId, limit: usize) -> Result<Vec<StoredMessage>, StoreError>;
}

#[derive(Debug)]
pub struct InMemoryMessageStore {
    rooms: RwLock<HashMap<RoomId, Vec<StoredMessage>>>,
    next_id: AtomicI64,
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        room: RoomId,
        nickname: Nickname,
        content: String,
        font_family: Option<String>,
    ) -> Result<StoredMessage, StoreError> {
        let message = StoredMessage {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            room_id: room,
            nickname,
            content,
            font_family,
            created_at: Utc::now(),
        };

        self.rooms
            .write()
            .await
            .entry(room)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn recent(&self, room: RoomId, limit: usize) -> Result<Vec<StoredMessage>, StoreError> {
        let rooms = self.rooms.read().await;
        let Some(messages) = rooms.get(&room) else {
            return Ok(Vec::new());
        };
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}
