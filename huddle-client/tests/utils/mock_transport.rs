use huddle_client::{ClientError, SignalingTransport};
use huddle_core::{ClientEvent, ConnectionId, Envelope, SignalKind};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// SignalingTransport that records outgoing events instead of sending them.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<ClientEvent>>,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every further send fail as if the websocket had dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<ClientEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// Kinds of the signaling payloads addressed to `to`, in send order.
    pub fn signals_to(&self, to: &ConnectionId) -> Vec<SignalKind> {
        let me = ConnectionId::new();
        self.sent()
            .into_iter()
            .filter_map(|event| event.into_envelope(me).ok())
            .filter(|envelope: &Envelope| envelope.to == *to)
            .map(|envelope| envelope.kind())
            .collect()
    }
}

impl SignalingTransport for MockTransport {
    fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::TransportClosed);
        }
        self.sent.lock().unwrap().push(event);
        Ok(())
    }
}
