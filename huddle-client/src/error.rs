use huddle_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("webrtc error: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("relay connection is closed")]
    TransportClosed,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("nickname '{0}' is already taken in this room")]
    NicknameTaken(String),

    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    #[error("peer orchestrator has stopped")]
    OrchestratorStopped,
}
