//! The seam between the orchestrator and a concrete peer-connection engine.

mod rtc_session;
mod rtc_track;

pub use rtc_session::RtcNegotiationFactory;
pub use rtc_track::RtcLocalTrack;

use crate::error::ClientError;
use crate::media::{LocalStream, RemoteTrack};
use async_trait::async_trait;
use huddle_core::{ConnectionId, SignalPayload};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    /// Opens the data channel and sends the offer. Only this side ever offers.
    Initiator,
    /// Waits for the remote offer and answers it.
    Responder,
}

pub struct SessionSpec {
    pub remote: ConnectionId,
    pub role: NegotiationRole,
    pub local_stream: Option<LocalStream>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    /// A locally produced payload that must reach the remote peer.
    Signal(SignalPayload),
    RemoteTrack {
        stream_id: String,
        track: RemoteTrack,
    },
    /// The remote stopped sending on a track reported by `RemoteTrack`.
    RemoteTrackEnded {
        track_id: String,
    },
    Connected,
    Failed(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub remote: ConnectionId,
    pub kind: SessionEventKind,
}

impl SessionEvent {
    pub fn new(remote: ConnectionId, kind: SessionEventKind) -> Self {
        Self { remote, kind }
    }
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

#[async_trait]
pub trait NegotiationFactory: Send + Sync {
    /// Creates one session. An initiator session emits its offer through
    /// `events` without further prompting.
    async fn open(
        &self,
        spec: SessionSpec,
        events: SessionEventSender,
    ) -> Result<Box<dyn NegotiationSession>, ClientError>;
}

#[async_trait]
pub trait NegotiationSession: Send + Sync {
    /// Applies a payload received from the remote peer. Candidates that
    /// arrive before a remote description are buffered.
    async fn apply_remote(&self, payload: SignalPayload) -> Result<(), ClientError>;

    /// Swaps the outgoing tracks; `None` detaches them. Must not require a
    /// fresh offer/answer exchange, so both ends may call it at any time.
    async fn replace_local_stream(&self, stream: Option<&LocalStream>) -> Result<(), ClientError>;

    async fn close(&self);
}
