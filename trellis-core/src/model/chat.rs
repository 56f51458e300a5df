use crate::model::room::RoomName;
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoomInfo {
    pub name: RoomName,
    pub occupancy: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ChatClientMessage {
    ListRooms,
    Enter { room: RoomName },
    Message { room: RoomName, text: String },
    Leave { room: RoomName },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ChatServerMessage {
    RoomList {
        rooms: Vec<ChatRoomInfo>,
    },
    Entered {
        room: RoomName,
    },
    PeerEntered {
        room: RoomName,
        session_id: SessionId,
    },
    Message {
        room: RoomName,
        sender: SessionId,
        text: String,
    },
    PeerLeft {
        room: RoomName,
        session_id: SessionId,
    },
    Error {
        message: String,
    },
}
