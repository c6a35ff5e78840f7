mod error;
pub mod media;
pub mod negotiation;
pub mod orchestrator;
pub mod presence;
pub mod transport;

pub use error::ClientError;
pub use media::{LocalStream, MediaTrack, RemoteStream, RemoteTrack, TrackKind};
pub use negotiation::{
    NegotiationFactory, NegotiationRole, NegotiationSession, RtcLocalTrack,
    RtcNegotiationFactory, SessionEvent, SessionEventKind, SessionEventSender, SessionSpec,
};
pub use orchestrator::{
    OrchestratorCommand, OrchestratorHandle, PeerOrchestrator, SessionState, SessionView,
};
pub use presence::RoomPresence;
pub use transport::{RelayClient, SignalingTransport};
