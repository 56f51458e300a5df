use trellis_core::model::{ChatClientMessage, ChatServerMessage, RoomName, SessionId};

use crate::chat_tests::{default_rooms, enter, send_chat};
use crate::utils::SIGNAL_TIMEOUT_MS;
use crate::{create_test_chat, init_tracing};
use trellis_server::ChatCommand;

#[tokio::test]
async fn test_leave_notifies_the_remaining_members() {
    init_tracing();

    let (tx, output) = create_test_chat(default_rooms());
    let (s1, s2) = (SessionId::new(), SessionId::new());
    let general = RoomName::from("general");

    enter(&tx, &s1, &general).await;
    enter(&tx, &s2, &general).await;
    assert!(output.wait_for_deliveries(3, SIGNAL_TIMEOUT_MS).await);
    output.clear().await;

    send_chat(
        &tx,
        &s2,
        ChatClientMessage::Leave {
            room: general.clone(),
        },
    )
    .await;

    assert!(output.wait_for_session(&s1, 1, SIGNAL_TIMEOUT_MS).await);
    assert_eq!(
        output.messages_for(&s1).await,
        vec![ChatServerMessage::PeerLeft {
            room: general,
            session_id: s2,
        }]
    );
}

#[tokio::test]
async fn test_disconnect_prunes_every_joined_room() {
    init_tracing();

    let (tx, output) = create_test_chat(default_rooms());
    let (leaver, witness) = (SessionId::new(), SessionId::new());
    let general = RoomName::from("general");
    let backend = RoomName::from("backend");

    enter(&tx, &witness, &general).await;
    enter(&tx, &witness, &backend).await;
    enter(&tx, &leaver, &general).await;
    enter(&tx, &leaver, &backend).await;
    assert!(output.wait_for_deliveries(6, SIGNAL_TIMEOUT_MS).await);
    output.clear().await;

    tx.send(ChatCommand::Disconnect {
        session_id: leaver.clone(),
    })
    .await
    .unwrap();

    assert!(output.wait_for_session(&witness, 2, SIGNAL_TIMEOUT_MS).await);
    let messages = output.messages_for(&witness).await;
    let mut left_rooms: Vec<RoomName> = messages
        .iter()
        .map(|message| match message {
            ChatServerMessage::PeerLeft { room, session_id } => {
                assert_eq!(session_id, &leaver);
                room.clone()
            }
            other => panic!("unexpected message: {other:?}"),
        })
        .collect();
    left_rooms.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    assert_eq!(left_rooms, vec![backend, general]);
}

#[tokio::test]
async fn test_listing_reflects_departures() {
    init_tracing();

    let (tx, output) = create_test_chat(default_rooms());
    let (resident, visitor) = (SessionId::new(), SessionId::new());
    let general = RoomName::from("general");

    enter(&tx, &resident, &general).await;
    assert!(output.wait_for_session(&resident, 1, SIGNAL_TIMEOUT_MS).await);

    send_chat(
        &tx,
        &resident,
        ChatClientMessage::Leave {
            room: general.clone(),
        },
    )
    .await;
    send_chat(&tx, &visitor, ChatClientMessage::ListRooms).await;

    assert!(output.wait_for_session(&visitor, 1, SIGNAL_TIMEOUT_MS).await);
    let messages = output.messages_for(&visitor).await;
    match &messages[0] {
        ChatServerMessage::RoomList { rooms } => {
            let info = rooms
                .iter()
                .find(|info| info.name == general)
                .expect("general should be listed");
            assert_eq!(info.occupancy, 0);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}
