use crate::model::nickname::Nickname;
use crate::model::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat line as kept by the message store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: i64,
    pub room_id: RoomId,
    pub nickname: Nickname,
    pub content: String,
    pub font_family: Option<String>,
    pub created_at: DateTime<Utc>,
}
