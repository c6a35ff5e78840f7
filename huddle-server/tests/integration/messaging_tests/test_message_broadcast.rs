use huddle_core::{ClientEvent, RoomId, ServerEvent};

use crate::integration::init_tracing;
use crate::utils::{create_relay, join, nick};

fn send(room: RoomId, nickname: &str, content: &str, font: Option<&str>) -> ClientEvent {
    ClientEvent::SendMessage {
        room_id: room,
        nickname: nick(nickname),
        content: content.into(),
        font_family: font.map(str::to_owned),
    }
}

#[tokio::test]
async fn test_message_reaches_whole_room_with_default_font() {
    init_tracing();

    let (relay, sink) = create_relay();
    let a = join(&relay, &sink, RoomId(1), "Fox1").await;
    let b = join(&relay, &sink, RoomId(1), "Owl2").await;
    let outsider = join(&relay, &sink, RoomId(2), "Lynx3").await;
    sink.clear();

    relay.dispatch(a, send(RoomId(1), "Fox1", "hello there", None)).await;

    for member in [a, b] {
        let events = sink.events_for(&member);
        assert_eq!(events.len(), 1);
        let ServerEvent::NewMessage(message) = &events[0] else {
            panic!("expected new_message");
        };
        assert_eq!(message.nickname.as_str(), "Fox1");
        assert_eq!(message.content, "hello there");
        assert_eq!(message.font_family, "sans-serif");
    }
    assert!(sink.events_for(&outsider).is_empty());
}

#[tokio::test]
async fn test_late_joiner_receives_history_in_order() {
    init_tracing();

    let (relay, sink) = create_relay();
    let a = join(&relay, &sink, RoomId(1), "Fox1").await;
    relay.dispatch(a, send(RoomId(1), "Fox1", "first", Some("monospace"))).await;
    relay.dispatch(a, send(RoomId(1), "Fox1", "second", None)).await;

    let late = join(&relay, &sink, RoomId(1), "Late9").await;
    let history = sink
        .events_for(&late)
        .into_iter()
        .find_map(|e| match e {
            ServerEvent::MessageHistory(messages) => Some(messages),
            _ => None,
        })
        .expect("history delivered on join");

    let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["first", "second"]);
    assert_eq!(history[0].font_family.as_deref(), Some("monospace"));
}

#[tokio::test]
async fn test_blank_message_is_rejected_for_sender_only() {
    init_tracing();

    let (relay, sink) = create_relay();
    let a = join(&relay, &sink, RoomId(1), "Fox1").await;
    let b = join(&relay, &sink, RoomId(1), "Owl2").await;
    sink.clear();

    relay.dispatch(a, send(RoomId(1), "Fox1", "   ", None)).await;

    assert_eq!(sink.names_for(&a), vec!["error"]);
    assert!(sink.events_for(&b).is_empty());
}
