use crate::error::RelayError;
use crate::registry::{ConnectionEntry, ConnectionRegistry};
use crate::room::RoomDirectory;
use crate::signaling::EventSink;
use crate::store::MessageStore;
use chrono::Utc;
use huddle_core::{
    ClientEvent, ConnectionId, DEFAULT_FONT_FAMILY, Envelope, NewMessage, Nickname,
    PresenceNotice, RoomId, ServerEvent,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Server-side router for chat and signaling events.
///
/// Keeps no state of its own beyond the registry: signaling envelopes are
/// forwarded by recipient id and forgotten. Events of one connection must be
/// dispatched one at a time, in arrival order; different connections may
/// interleave freely.
pub struct SignalingRelay {
    registry: Arc<ConnectionRegistry>,
    directory: RoomDirectory,
    sink: Arc<dyn EventSink>,
    store: Arc<dyn MessageStore>,
    history_limit: usize,
}

impl SignalingRelay {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        sink: Arc<dyn EventSink>,
        store: Arc<dyn MessageStore>,
        history_limit: usize,
    ) -> Self {
        let directory = RoomDirectory::new(registry.clone(), sink.clone());
        Self {
            registry,
            directory,
            sink,
            store,
            history_limit,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    /// Handles one event; a failure becomes an `error` notice for the sender only.
    pub async fn dispatch(&self, from: ConnectionId, event: ClientEvent) {
        if let Err(e) = self.handle(from, event).await {
            warn!("Event from {} failed: {}", from, e);
            self.sink.send_to(&from, &ServerEvent::Error(e.notice()));
        }
    }

    pub async fn handle(&self, from: ConnectionId, event: ClientEvent) -> Result<(), RelayError> {
        match event {
            ClientEvent::JoinRoom { room_id, nickname } => {
                self.join_room(from, room_id, nickname).await;
            }

            ClientEvent::SendMessage {
                room_id,
                nickname,
                content,
                font_family,
            } => {
                self.send_message(room_id, nickname, content, font_family)
                    .await?;
            }

            ClientEvent::ChangeNickname {
                room_id,
                old_nickname,
                new_nickname,
            } => {
                self.change_nickname(from, room_id, old_nickname, new_nickname);
            }

            signal => {
                if let Ok(envelope) = signal.into_envelope(from) {
                    self.forward(envelope);
                }
            }
        }

        Ok(())
    }

    async fn join_room(&self, from: ConnectionId, room: RoomId, nickname: Nickname) {
        self.registry.register(from, nickname.clone(), room);
        info!("{} ({}) joined room {}", nickname, from, room);

        // The joiner is included; clients skip their own join.
        let notice = ServerEvent::UserJoined(PresenceNotice {
            nickname,
            timestamp: Utc::now(),
            identifier: from,
        });
        self.directory.broadcast(room, &notice, None);

        match self.store.recent(room, self.history_limit).await {
            Ok(messages) => {
                self.sink.send_to(&from, &ServerEvent::MessageHistory(messages));
            }
            Err(e) => error!("Failed to load history of room {} for {}: {}", room, from, e),
        }
    }

    async fn send_message(
        &self,
        room: RoomId,
        nickname: Nickname,
        content: String,
        font_family: Option<String>,
    ) -> Result<(), RelayError> {
        if content.trim().is_empty() {
            return Err(RelayError::EmptyMessage);
        }

        // Broadcast only once the write has landed.
        let stored = self
            .store
            .append(room, nickname, content, font_family)
            .await?;

        let message = ServerEvent::NewMessage(NewMessage {
            nickname: stored.nickname,
            content: stored.content,
            font_family: stored
                .font_family
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_owned()),
            timestamp: stored.created_at,
        });
        self.directory.broadcast(room, &message, None);
        Ok(())
    }

    /// Fire-and-forget: an absent recipient means the envelope is dropped and
    /// the sender hears nothing about it.
    fn forward(&self, envelope: Envelope) {
        let to = envelope.to;
        let kind = envelope.kind();
        let from = envelope.from;

        if self.sink.send_to(&to, &ServerEvent::from(envelope)) {
            debug!("Forwarded {} {} -> {}", kind, from, to);
        } else {
            debug!("Dropped {} {} -> {}: recipient not connected", kind, from, to);
        }
    }

    /// Uniqueness is deliberately not checked here.
    fn change_nickname(
        &self,
        from: ConnectionId,
        room: RoomId,
        old_nickname: Nickname,
        new_nickname: Nickname,
    ) {
        if !self.registry.update_nickname(&from, new_nickname.clone()) {
            warn!("Nickname change from unregistered connection {}", from);
            return;
        }

        info!("{} renamed {} -> {}", from, old_nickname, new_nickname);
        let notice = ServerEvent::NicknameChanged {
            old_nickname,
            new_nickname,
        };
        self.directory.broadcast(room, &notice, None);
    }

    /// Transport-level disconnect. Removes the registry entry and tells the
    /// former room; a connection that never joined leaves silently.
    pub fn disconnect(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        let entry = self.registry.remove(id)?;
        info!("{} ({}) left room {}", entry.nickname, id, entry.room);

        let notice = ServerEvent::UserLeft(PresenceNotice {
            nickname: entry.nickname.clone(),
            timestamp: Utc::now(),
            identifier: *id,
        });
        self.directory.broadcast(entry.room, &notice, Some(id));
        Some(entry)
    }
}
