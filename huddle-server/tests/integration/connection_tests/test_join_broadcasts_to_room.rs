use huddle_core::{RoomId, ServerEvent};

use crate::integration::init_tracing;
use crate::utils::{create_relay, join};

#[tokio::test]
async fn test_join_broadcasts_to_room() {
    init_tracing();

    let (relay, sink) = create_relay();
    let room = RoomId(1);

    let a = join(&relay, &sink, room, "CalmOtter1").await;
    let b = join(&relay, &sink, room, "SwiftFox2").await;

    // A saw its own join, then B's.
    assert_eq!(
        sink.names_for(&a),
        vec!["user_joined", "message_history", "user_joined"]
    );

    let ServerEvent::UserJoined(notice) = &sink.events_for(&a)[2] else {
        panic!("expected user_joined");
    };
    assert_eq!(notice.identifier, b);
    assert_eq!(notice.nickname.as_str(), "SwiftFox2");

    // B receives its own join followed by the (empty) history.
    assert_eq!(sink.names_for(&b), vec!["user_joined", "message_history"]);
}

#[tokio::test]
async fn test_membership_matches_registry_after_many_joins() {
    init_tracing();

    let (relay, sink) = create_relay();
    let room = RoomId(7);
    let other_room = RoomId(8);

    let mut expected = std::collections::HashSet::new();
    for i in 0..10 {
        expected.insert(join(&relay, &sink, room, &format!("Member{i}")).await);
        join(&relay, &sink, other_room, &format!("Outsider{i}")).await;
    }

    let members = relay.directory().members_of(room);
    assert_eq!(members, expected);

    // Every member has a registry entry naming the room and nobody else does.
    for id in &members {
        assert_eq!(relay.registry().get(id).map(|e| e.room), Some(room));
    }
    assert_eq!(relay.registry().len(), 20);

    // Join notices never cross rooms: member i saw the joins of members i..10.
    let mut notices_seen = 0;
    for id in &members {
        for event in sink.events_for(id) {
            if let ServerEvent::UserJoined(notice) = event {
                assert!(expected.contains(&notice.identifier));
                notices_seen += 1;
            }
        }
    }
    assert_eq!(notices_seen, (1..=10).sum::<usize>());
}
