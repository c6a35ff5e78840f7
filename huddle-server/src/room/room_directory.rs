use crate::registry::ConnectionRegistry;
use crate::signaling::EventSink;
use huddle_core::{ConnectionId, RoomId, ServerEvent};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Room-scoped view over the registry. Rooms are not stored anywhere; a
/// connection is a member exactly while its registry entry names the room.
#[derive(Clone)]
pub struct RoomDirectory {
    registry: Arc<ConnectionRegistry>,
    sink: Arc<dyn EventSink>,
}

impl RoomDirectory {
    pub fn new(registry: Arc<ConnectionRegistry>, sink: Arc<dyn EventSink>) -> Self {
        Self { registry, sink }
    }

    /// Derived on every call so it can never go stale.
    pub fn members_of(&self, room: RoomId) -> HashSet<ConnectionId> {
        self.registry.connections_in(room).into_iter().collect()
    }

    /// Delivers `event` to every current member except `exclude`. Returns the
    /// number of members whose channel accepted it.
    pub fn broadcast(
        &self,
        room: RoomId,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let delivered = self
            .registry
            .connections_in(room)
            .iter()
            .filter(|member| Some(*member) != exclude)
            .filter(|member| self.sink.send_to(member, event))
            .count();

        debug!(
            "Broadcast '{}' to room {} reached {} member(s)",
            event.name(),
            room,
            delivered
        );
        delivered
    }
}
