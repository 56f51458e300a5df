use crate::model::media::MediaState;
use crate::model::peer::PeerId;
use crate::model::room::RoomName;
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Trickle candidate payload, shaped after the browser/webrtc candidate
/// init dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// One roster entry of a membership broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub session_id: SessionId,
    pub peer_id: PeerId,
}

/// Messages a client sends to the relay.
///
/// `Answer` and `IceCandidate` name both the sending peer and the peer
/// the payload is meant for. The relay still fans out to the whole
/// room; recipients drop anything not targeting them and match the
/// sender against their own connection table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    Join {
        peer_id: PeerId,
        media: MediaState,
    },
    Offer {
        room: RoomName,
        peer_id: PeerId,
        sdp: String,
    },
    Answer {
        peer_id: PeerId,
        target: PeerId,
        sdp: String,
    },
    IceCandidate {
        peer_id: PeerId,
        target: PeerId,
        candidate: IceCandidate,
    },
    MediaState {
        room: RoomName,
        peer_id: PeerId,
        media: MediaState,
    },
    Leave {
        room: RoomName,
        peer_id: PeerId,
    },
}

/// Messages the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Joined {
        room: RoomName,
    },
    PeerJoined {
        room: RoomName,
        peer_id: PeerId,
    },
    MembersChanged {
        members: Vec<RoomMember>,
    },
    Offer {
        room: RoomName,
        peer_id: PeerId,
        sdp: String,
    },
    Answer {
        peer_id: PeerId,
        target: PeerId,
        sdp: String,
    },
    IceCandidate {
        peer_id: PeerId,
        target: PeerId,
        candidate: IceCandidate,
    },
    MediaState {
        room: RoomName,
        peer_id: PeerId,
        media: MediaState,
    },
    PeerLeft {
        peer_id: PeerId,
    },
}
