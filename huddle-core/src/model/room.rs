use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SLUG_LEN: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(pub i64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat room as handed out by the room lookup: numeric id plus the slug
/// used in URLs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub slug: String,
}

impl Room {
    pub fn validate_slug(slug: &str) -> Result<&str, CoreError> {
        let len = slug.chars().count();
        if len == 0 || len > MAX_SLUG_LEN {
            return Err(CoreError::InvalidSlug { max: MAX_SLUG_LEN });
        }
        Ok(slug)
    }
}
