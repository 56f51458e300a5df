mod chat_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use trellis_core::model::RoomName;
use trellis_server::{ChatCommand, ChatRelay, Relay, RelayCommand};

use crate::utils::{MockChatOutput, MockRelayOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn video_room() -> RoomName {
    RoomName::from("videoChatRoom")
}

/// Spawns a relay task wired to a recording output.
pub fn create_test_relay() -> (mpsc::Sender<RelayCommand>, MockRelayOutput) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RelayCommand>(100);
    let output = MockRelayOutput::new();

    let relay = Relay::new(video_room(), cmd_rx, Arc::new(output.clone()));
    tokio::spawn(relay.run());

    (cmd_tx, output)
}

/// Spawns a chat task over the given room set, wired to a recording
/// output.
pub fn create_test_chat(rooms: Vec<RoomName>) -> (mpsc::Sender<ChatCommand>, MockChatOutput) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ChatCommand>(100);
    let output = MockChatOutput::new();

    let chat = ChatRelay::new(rooms, cmd_rx, Arc::new(output.clone()));
    tokio::spawn(chat.run());

    (cmd_tx, output)
}
