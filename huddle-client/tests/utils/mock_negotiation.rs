use async_trait::async_trait;
use huddle_client::{
    ClientError, LocalStream, NegotiationFactory, NegotiationRole, NegotiationSession,
    SessionEvent, SessionEventKind, SessionEventSender, SessionSpec,
};
use huddle_core::{ConnectionId, SessionDescription, SignalKind, SignalPayload};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    opened: Mutex<Vec<(ConnectionId, NegotiationRole, Option<String>)>>,
    applied: Mutex<Vec<(ConnectionId, SignalKind)>>,
    stream_updates: Mutex<Vec<(ConnectionId, Option<String>)>>,
    closed: Mutex<Vec<ConnectionId>>,
    senders: Mutex<HashMap<ConnectionId, SessionEventSender>>,
    fail_apply: Mutex<HashSet<ConnectionId>>,
}

/// NegotiationFactory whose sessions only record what they were asked to do.
///
/// Initiator sessions emit a fake offer on open; every applied offer is
/// answered with a fake answer. Further engine events are injected with `emit`.
#[derive(Default)]
pub struct MockNegotiationFactory {
    state: Arc<MockState>,
}

impl MockNegotiationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<(ConnectionId, NegotiationRole, Option<String>)> {
        self.state.opened.lock().unwrap().clone()
    }

    pub fn open_count(&self, remote: &ConnectionId) -> usize {
        self.opened().iter().filter(|(id, _, _)| id == remote).count()
    }

    pub fn applied_to(&self, remote: &ConnectionId) -> Vec<SignalKind> {
        self.state
            .applied
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == remote)
            .map(|(_, kind)| *kind)
            .collect()
    }

    /// Stream ids handed to `remote` after creation; `None` marks a detach.
    pub fn stream_updates(&self, remote: &ConnectionId) -> Vec<Option<String>> {
        self.state
            .stream_updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == remote)
            .map(|(_, stream)| stream.clone())
            .collect()
    }

    pub fn closed(&self) -> Vec<ConnectionId> {
        self.state.closed.lock().unwrap().clone()
    }

    pub fn fail_apply_for(&self, remote: ConnectionId) {
        self.state.fail_apply.lock().unwrap().insert(remote);
    }

    /// Pushes an engine event for `remote` as if the peer connection raised it.
    pub fn emit(&self, remote: ConnectionId, kind: SessionEventKind) -> bool {
        let senders = self.state.senders.lock().unwrap();
        match senders.get(&remote) {
            Some(tx) => tx.send(SessionEvent::new(remote, kind)).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl NegotiationFactory for MockNegotiationFactory {
    async fn open(
        &self,
        spec: SessionSpec,
        events: SessionEventSender,
    ) -> Result<Box<dyn NegotiationSession>, ClientError> {
        let stream_id = spec.local_stream.as_ref().map(|s| s.id().to_owned());
        self.state
            .opened
            .lock()
            .unwrap()
            .push((spec.remote, spec.role, stream_id));
        self.state
            .senders
            .lock()
            .unwrap()
            .insert(spec.remote, events.clone());

        let session = MockSession {
            remote: spec.remote,
            events,
            state: self.state.clone(),
        };
        if spec.role == NegotiationRole::Initiator {
            session.emit(SignalPayload::Offer(SessionDescription {
                sdp: format!("mock-offer-{}", spec.remote),
            }));
        }
        Ok(Box::new(session))
    }
}

struct MockSession {
    remote: ConnectionId,
    events: SessionEventSender,
    state: Arc<MockState>,
}

impl MockSession {
    fn emit(&self, payload: SignalPayload) {
        let _ = self
            .events
            .send(SessionEvent::new(self.remote, SessionEventKind::Signal(payload)));
    }
}

#[async_trait]
impl NegotiationSession for MockSession {
    async fn apply_remote(&self, payload: SignalPayload) -> Result<(), ClientError> {
        if self.state.fail_apply.lock().unwrap().contains(&self.remote) {
            return Err(ClientError::Negotiation("mock rejects payload".into()));
        }

        let kind = payload.kind();
        self.state
            .applied
            .lock()
            .unwrap()
            .push((self.remote, kind));

        if kind == SignalKind::Offer {
            self.emit(SignalPayload::Answer(SessionDescription {
                sdp: format!("mock-answer-{}", self.remote),
            }));
        }
        Ok(())
    }

    async fn replace_local_stream(&self, stream: Option<&LocalStream>) -> Result<(), ClientError> {
        self.state
            .stream_updates
            .lock()
            .unwrap()
            .push((self.remote, stream.map(|s| s.id().to_owned())));
        Ok(())
    }

    async fn close(&self) {
        self.state.closed.lock().unwrap().push(self.remote);
    }
}
