use crate::model::connection::ConnectionId;
use crate::model::message::StoredMessage;
use crate::model::nickname::Nickname;
use crate::model::room::RoomId;
use crate::model::signaling::{
    Envelope, IceCandidate, IceServerConfig, SessionDescription, SignalPayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Events a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinRoom {
        room_id: RoomId,
        nickname: Nickname,
    },
    SendMessage {
        room_id: RoomId,
        nickname: Nickname,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_family: Option<String>,
    },
    WebrtcOffer {
        to: ConnectionId,
        offer: SessionDescription,
    },
    WebrtcAnswer {
        to: ConnectionId,
        answer: SessionDescription,
    },
    WebrtcIceCandidate {
        to: ConnectionId,
        candidate: IceCandidate,
    },
    ChangeNickname {
        room_id: RoomId,
        old_nickname: Nickname,
        new_nickname: Nickname,
    },
}

impl ClientEvent {
    /// Wraps a negotiation payload in the event that addresses it to `to`.
    pub fn signal(to: ConnectionId, payload: SignalPayload) -> Self {
        match payload {
            SignalPayload::Offer(offer) => ClientEvent::WebrtcOffer { to, offer },
            SignalPayload::Answer(answer) => ClientEvent::WebrtcAnswer { to, answer },
            SignalPayload::IceCandidate(candidate) => {
                ClientEvent::WebrtcIceCandidate { to, candidate }
            }
        }
    }

    /// Turns a signaling event into an envelope stamped with its sender.
    /// Non-signaling events are handed back unchanged.
    pub fn into_envelope(self, from: ConnectionId) -> Result<Envelope, ClientEvent> {
        let (to, payload) = match self {
            ClientEvent::WebrtcOffer { to, offer } => (to, SignalPayload::Offer(offer)),
            ClientEvent::WebrtcAnswer { to, answer } => (to, SignalPayload::Answer(answer)),
            ClientEvent::WebrtcIceCandidate { to, candidate } => {
                (to, SignalPayload::IceCandidate(candidate))
            }
            other => return Err(other),
        };
        Ok(Envelope { from, to, payload })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub nickname: Nickname,
    pub content: String,
    pub font_family: String,
    pub timestamp: DateTime<Utc>,
}

/// Payload of `user_joined` and `user_left`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceNotice {
    pub nickname: Nickname,
    pub timestamp: DateTime<Utc>,
    pub identifier: ConnectionId,
}

/// Events the relay delivers to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Welcome {
        identifier: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    MessageHistory(Vec<StoredMessage>),
    NewMessage(NewMessage),
    UserJoined(PresenceNotice),
    UserLeft(PresenceNotice),
    NicknameChanged {
        old_nickname: Nickname,
        new_nickname: Nickname,
    },
    WebrtcOffer {
        from: ConnectionId,
        offer: SessionDescription,
    },
    WebrtcAnswer {
        from: ConnectionId,
        answer: SessionDescription,
    },
    WebrtcIceCandidate {
        from: ConnectionId,
        candidate: IceCandidate,
    },
    Error(String),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Welcome { .. } => "welcome",
            ServerEvent::MessageHistory(_) => "message_history",
            ServerEvent::NewMessage(_) => "new_message",
            ServerEvent::UserJoined(_) => "user_joined",
            ServerEvent::UserLeft(_) => "user_left",
            ServerEvent::NicknameChanged { .. } => "nickname_changed",
            ServerEvent::WebrtcOffer { .. } => "webrtc_offer",
            ServerEvent::WebrtcAnswer { .. } => "webrtc_answer",
            ServerEvent::WebrtcIceCandidate { .. } => "webrtc_ice_candidate",
            ServerEvent::Error(_) => "error",
        }
    }

    /// Splits an inbound signaling event into sender and payload.
    pub fn into_signal(self) -> Result<(ConnectionId, SignalPayload), ServerEvent> {
        match self {
            ServerEvent::WebrtcOffer { from, offer } => Ok((from, SignalPayload::Offer(offer))),
            ServerEvent::WebrtcAnswer { from, answer } => {
                Ok((from, SignalPayload::Answer(answer)))
            }
            ServerEvent::WebrtcIceCandidate { from, candidate } => {
                Ok((from, SignalPayload::IceCandidate(candidate)))
            }
            other => Err(other),
        }
    }
}

impl From<Envelope> for ServerEvent {
    fn from(envelope: Envelope) -> Self {
        let from = envelope.from;
        match envelope.payload {
            SignalPayload::Offer(offer) => ServerEvent::WebrtcOffer { from, offer },
            SignalPayload::Answer(answer) => ServerEvent::WebrtcAnswer { from, answer },
            SignalPayload::IceCandidate(candidate) => {
                ServerEvent::WebrtcIceCandidate { from, candidate }
            }
        }
    }
}
