use huddle_core::{RoomId, ServerEvent};

use crate::integration::init_tracing;
use crate::utils::{create_relay, join};

#[tokio::test]
async fn test_disconnect_triggers_single_leave_in_former_room() {
    init_tracing();

    let (relay, sink) = create_relay();
    let a = join(&relay, &sink, RoomId(1), "Fox1").await;
    let b = join(&relay, &sink, RoomId(1), "Owl2").await;
    let c = join(&relay, &sink, RoomId(2), "Lynx3").await;
    sink.clear();

    sink.disconnect(&a);
    let removed = relay.disconnect(&a).expect("A was registered");
    assert_eq!(removed.room, RoomId(1));
    assert_eq!(relay.registry().len(), 2);
    assert!(!relay.registry().contains(&a));

    let b_events = sink.events_for(&b);
    assert_eq!(b_events.len(), 1);
    let ServerEvent::UserLeft(notice) = &b_events[0] else {
        panic!("expected user_left");
    };
    assert_eq!(notice.identifier, a);
    assert_eq!(notice.nickname.as_str(), "Fox1");

    assert!(sink.events_for(&c).is_empty());
}

#[tokio::test]
async fn test_second_disconnect_is_silent() {
    init_tracing();

    let (relay, sink) = create_relay();
    let a = join(&relay, &sink, RoomId(1), "Fox1").await;
    let _b = join(&relay, &sink, RoomId(1), "Owl2").await;

    relay.disconnect(&a);
    sink.clear();

    assert!(relay.disconnect(&a).is_none());
    assert_eq!(sink.total_delivered(), 0);
}

#[tokio::test]
async fn test_disconnect_without_join_broadcasts_nothing() {
    init_tracing();

    let (relay, sink) = create_relay();
    let _member = join(&relay, &sink, RoomId(1), "Fox1").await;
    sink.clear();

    let stranger = huddle_core::ConnectionId::new();
    assert!(relay.disconnect(&stranger).is_none());
    assert_eq!(sink.total_delivered(), 0);
}
