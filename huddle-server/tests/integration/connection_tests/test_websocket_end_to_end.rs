use huddle_core::{ClientEvent, RoomId, ServerEvent};

use crate::integration::init_tracing;
use crate::utils::{WsTestClient, nick, offer, spawn_server};

#[tokio::test]
async fn test_websocket_join_signal_and_leave() {
    init_tracing();

    let (addr, state) = spawn_server().await.expect("Failed to start server");

    let mut a = WsTestClient::connect(addr).await.expect("A failed to connect");
    a.send(&ClientEvent::JoinRoom {
        room_id: RoomId(1),
        nickname: nick("HappyPanda1"),
    })
    .await
    .unwrap();
    a.wait_for("message_history").await.unwrap();

    let mut b = WsTestClient::connect(addr).await.expect("B failed to connect");
    assert_ne!(a.id, b.id);
    b.send(&ClientEvent::JoinRoom {
        room_id: RoomId(1),
        nickname: nick("BoldEagle2"),
    })
    .await
    .unwrap();

    let ServerEvent::UserJoined(joined) = a.wait_for("user_joined").await.unwrap() else {
        unreachable!()
    };
    assert_eq!(joined.identifier, b.id);
    b.wait_for("message_history").await.unwrap();

    // A starts negotiating with B through the relay.
    a.send(&offer(b.id, "v=0 offer-from-a")).await.unwrap();
    let ServerEvent::WebrtcOffer { from, offer: description } = b.wait_for("webrtc_offer").await.unwrap() else {
        unreachable!()
    };
    assert_eq!(from, a.id);
    assert_eq!(description.sdp, "v=0 offer-from-a");

    let b_id = b.id;
    b.close().await.unwrap();

    let ServerEvent::UserLeft(left) = a.wait_for("user_left").await.unwrap() else {
        unreachable!()
    };
    assert_eq!(left.identifier, b_id);
    assert_eq!(left.nickname.as_str(), "BoldEagle2");
    assert!(!state.hub.is_connected(&b_id));
}

#[tokio::test]
async fn test_invalid_frame_keeps_connection_open() {
    init_tracing();

    let (addr, _state) = spawn_server().await.expect("Failed to start server");
    let mut a = WsTestClient::connect(addr).await.unwrap();

    // Empty nickname fails validation and is ignored.
    let raw = serde_json::json!({
        "event": "join_room",
        "data": { "roomId": 1, "nickname": "" }
    });
    a.send_raw(raw.to_string()).await.unwrap();

    a.send(&ClientEvent::JoinRoom {
        room_id: RoomId(1),
        nickname: nick("KeenOwl3"),
    })
    .await
    .unwrap();

    let ServerEvent::UserJoined(joined) = a.next_event().await.unwrap() else {
        panic!("expected the valid join to be processed");
    };
    assert_eq!(joined.nickname.as_str(), "KeenOwl3");
}
