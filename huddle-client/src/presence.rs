//! Client-side view of which nicknames are in use in the current room.
//!
//! Seeded from the authors of `message_history` and kept current from presence
//! notices: a name is released when its holder leaves or renames. It only
//! guards self-selected renames; the relay never re-checks, so two clients
//! renaming at the same moment can still collide.

use crate::error::ClientError;
use huddle_core::{ConnectionId, Nickname, ServerEvent};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct RoomPresence {
    own: Option<Nickname>,
    roster: HashMap<ConnectionId, Nickname>,
    used: HashSet<String>,
}

impl RoomPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_own(&mut self, nickname: Nickname) {
        self.own = Some(nickname);
    }

    pub fn own(&self) -> Option<&Nickname> {
        self.own.as_ref()
    }

    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::MessageHistory(messages) => {
                self.used
                    .extend(messages.iter().map(|m| m.nickname.to_string()));
            }
            ServerEvent::NewMessage(message) => {
                self.used.insert(message.nickname.to_string());
            }
            ServerEvent::UserJoined(notice) => {
                self.roster.insert(notice.identifier, notice.nickname.clone());
                self.used.insert(notice.nickname.to_string());
            }
            ServerEvent::UserLeft(notice) => {
                self.roster.remove(&notice.identifier);
                self.release(&notice.nickname);
            }
            ServerEvent::NicknameChanged {
                old_nickname,
                new_nickname,
            } => {
                if let Some(nickname) = self.roster.values_mut().find(|n| **n == *old_nickname) {
                    *nickname = new_nickname.clone();
                }
                self.release(old_nickname);
                self.used.insert(new_nickname.to_string());
            }
            _ => {}
        }
    }

    /// Forgets `nickname` unless another roster member still carries it.
    fn release(&mut self, nickname: &Nickname) {
        if !self.roster.values().any(|n| n == nickname) {
            self.used.remove(nickname.as_str());
        }
    }

    /// Whether someone other than us is known under `nickname`.
    pub fn is_taken(&self, nickname: &str) -> bool {
        if self.own.as_ref().is_some_and(|own| own == nickname) {
            return false;
        }
        self.used.contains(nickname)
    }

    /// Checks a rename we are about to request. `Ok(None)` means the
    /// candidate equals the current nickname and nothing should be sent.
    pub fn validate_rename(&self, candidate: &str) -> Result<Option<Nickname>, ClientError> {
        let nickname = Nickname::try_from(candidate)?;

        if self.own.as_ref() == Some(&nickname) {
            return Ok(None);
        }
        if self.is_taken(&nickname) {
            return Err(ClientError::NicknameTaken(nickname.into()));
        }
        Ok(Some(nickname))
    }
}
