use crate::signaling::EventSink;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct HubInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Outbound half of every open websocket, keyed by connection id.
#[derive(Clone)]
pub struct ChannelHub {
    inner: Arc<HubInner>,
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn add_connection(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(id, tx);
    }

    pub fn remove_connection(&self, id: &ConnectionId) {
        self.inner.connections.remove(id);
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }
}

impl EventSink for ChannelHub {
    fn send_to(&self, target: &ConnectionId, event: &ServerEvent) -> bool {
        let Some(tx) = self.inner.connections.get(target) else {
            debug!("Dropping '{}' for disconnected {}", event.name(), target);
            return false;
        };

        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize '{}': {}", event.name(), e);
                return false;
            }
        };

        if let Err(e) = tx.send(Message::Text(json.into())) {
            error!("Failed to queue WS message for {}: {:?}", target, e);
            return false;
        }
        true
    }
}
