use crate::CoreError;
use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

pub const MAX_NICKNAME_LEN: usize = 100;

/// Display name of a connection. Always trimmed and non-empty.
///
/// Uniqueness is not part of this type: two connections in one room may carry
/// the same nickname.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Word-list output is already trimmed and well under the length limit.
    pub(crate) fn generated(value: String) -> Self {
        Self(value)
    }

    /// Stand-in used until the real nickname behind `id` is known.
    pub fn placeholder_for(id: &ConnectionId) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyNickname);
        }
        if trimmed.chars().count() > MAX_NICKNAME_LEN {
            return Err(CoreError::NicknameTooLong {
                max: MAX_NICKNAME_LEN,
            });
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

impl TryFrom<&str> for Nickname {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<Nickname> for String {
    fn from(value: Nickname) -> Self {
        value.0
    }
}

impl Deref for Nickname {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Nickname {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
