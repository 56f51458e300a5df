mod test_leave_pruning;

use tokio::sync::mpsc;
use trellis_core::model::{ChatClientMessage, RoomName, SessionId};
use trellis_server::ChatCommand;

pub fn default_rooms() -> Vec<RoomName> {
    vec![RoomName::from("general"), RoomName::from("backend")]
}

pub async fn send_chat(
    tx: &mpsc::Sender<ChatCommand>,
    session_id: &SessionId,
    message: ChatClientMessage,
) {
    tx.send(ChatCommand::Message {
        session_id: session_id.clone(),
        message,
    })
    .await
    .expect("chat task is gone");
}

pub async fn enter(tx: &mpsc::Sender<ChatCommand>, session_id: &SessionId, room: &RoomName) {
    send_chat(
        tx,
        session_id,
        ChatClientMessage::Enter { room: room.clone() },
    )
    .await;
}
