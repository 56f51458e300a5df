use trellis_core::model::{ClientMessage, MediaState, PeerId, ServerMessage, SessionId};

use crate::utils::{DROP_WINDOW_MS, SIGNAL_TIMEOUT_MS, send_join, send_message};
use crate::{create_test_relay, init_tracing, video_room};

#[tokio::test]
async fn test_media_toggle_reaches_other_members_verbatim() {
    init_tracing();

    let (tx, output) = create_test_relay();
    let (s1, p1) = (SessionId::new(), PeerId::new());
    let (s2, p2) = (SessionId::new(), PeerId::new());

    send_join(&tx, &s1, &p1).await;
    send_join(&tx, &s2, &p2).await;
    assert!(output.wait_for_session(&s1, 5, SIGNAL_TIMEOUT_MS).await);
    output.clear().await;

    let muted = MediaState {
        video: true,
        audio: false,
    };
    send_message(
        &tx,
        &s1,
        ClientMessage::MediaState {
            room: video_room(),
            peer_id: p1.clone(),
            media: muted,
        },
    )
    .await;

    assert!(output.wait_for_session(&s2, 1, SIGNAL_TIMEOUT_MS).await);
    assert_eq!(
        output.messages_for(&s2).await,
        vec![ServerMessage::MediaState {
            room: video_room(),
            peer_id: p1.clone(),
            media: muted,
        }]
    );
    assert!(output.messages_for(&s1).await.is_empty());
}

#[tokio::test]
async fn test_media_state_from_unjoined_session_is_dropped() {
    init_tracing();

    let (tx, output) = create_test_relay();
    let (s1, p1) = (SessionId::new(), PeerId::new());
    let outsider = SessionId::new();

    send_join(&tx, &s1, &p1).await;
    assert!(output.wait_for_session(&s1, 2, SIGNAL_TIMEOUT_MS).await);
    output.clear().await;

    send_message(
        &tx,
        &outsider,
        ClientMessage::MediaState {
            room: video_room(),
            peer_id: PeerId::new(),
            media: MediaState::default(),
        },
    )
    .await;

    assert!(!output.wait_for_deliveries(1, DROP_WINDOW_MS).await);
}
