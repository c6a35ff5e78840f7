use std::sync::Arc;

use huddle_core::{ClientEvent, ConnectionId, IceCandidate, Nickname, RoomId, SessionDescription};
use huddle_server::{ConnectionRegistry, InMemoryMessageStore, MessageStore, SignalingRelay};

use super::mock_sink::MockEventSink;

pub const HISTORY_LIMIT: usize = 50;

pub fn nick(s: &str) -> Nickname {
    Nickname::try_from(s).unwrap()
}

/// Relay wired to a fresh registry, the given store and a recording sink.
pub fn create_relay_with_store(store: Arc<dyn MessageStore>) -> (SignalingRelay, Arc<MockEventSink>) {
    let sink = Arc::new(MockEventSink::new());
    let relay = SignalingRelay::new(
        Arc::new(ConnectionRegistry::new()),
        sink.clone(),
        store,
        HISTORY_LIMIT,
    );
    (relay, sink)
}

pub fn create_relay() -> (SignalingRelay, Arc<MockEventSink>) {
    create_relay_with_store(Arc::new(InMemoryMessageStore::new()))
}

/// Opens a connection on the sink and joins it to `room` as `nickname`.
pub async fn join(
    relay: &SignalingRelay,
    sink: &MockEventSink,
    room: RoomId,
    nickname: &str,
) -> ConnectionId {
    let id = ConnectionId::new();
    sink.connect(id);
    relay
        .dispatch(
            id,
            ClientEvent::JoinRoom {
                room_id: room,
                nickname: nick(nickname),
            },
        )
        .await;
    id
}

pub fn offer(to: ConnectionId, sdp: &str) -> ClientEvent {
    ClientEvent::WebrtcOffer {
        to,
        offer: SessionDescription { sdp: sdp.into() },
    }
}

pub fn host_candidate(to: ConnectionId) -> ClientEvent {
    ClientEvent::WebrtcIceCandidate {
        to,
        candidate: IceCandidate {
            candidate: "candidate:1 1 udp 2122260223 192.168.1.4 50000 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_m_line_index: Some(0),
        },
    }
}
