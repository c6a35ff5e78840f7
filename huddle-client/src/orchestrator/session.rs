use crate::media::RemoteStream;
use crate::negotiation::{NegotiationRole, NegotiationSession};
use huddle_core::{ConnectionId, Nickname};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Negotiating,
    Connected,
    Closed,
}

/// One media session with one remote connection. Owned by the orchestrator.
pub(crate) struct PeerSession {
    pub remote_id: ConnectionId,
    pub remote_nickname: Nickname,
    pub role: NegotiationRole,
    pub state: SessionState,
    pub handle: Box<dyn NegotiationSession>,
    pub stream: Option<RemoteStream>,
}

impl PeerSession {
    pub fn view(&self) -> SessionView {
        SessionView {
            remote_id: self.remote_id,
            remote_nickname: self.remote_nickname.clone(),
            role: self.role,
            state: self.state,
            stream: self.stream.clone(),
        }
    }
}

/// Read-only snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub remote_id: ConnectionId,
    pub remote_nickname: Nickname,
    pub role: NegotiationRole,
    pub state: SessionState,
    pub stream: Option<RemoteStream>,
}
