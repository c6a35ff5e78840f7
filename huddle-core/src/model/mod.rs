mod connection;
mod event;
mod message;
mod nickname;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use event::{ClientEvent, DEFAULT_FONT_FAMILY, NewMessage, PresenceNotice, ServerEvent};
pub use message::StoredMessage;
pub use nickname::{MAX_NICKNAME_LEN, Nickname};
pub use room::{MAX_SLUG_LEN, Room, RoomId};
pub use signaling::{Envelope, IceCandidate, IceServerConfig, SessionDescription, SignalKind, SignalPayload};
