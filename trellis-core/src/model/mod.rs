mod chat;
mod media;
mod peer;
mod room;
mod session;
mod signaling;

pub use chat::{ChatClientMessage, ChatRoomInfo, ChatServerMessage};
pub use media::{MediaKind, MediaState};
pub use peer::PeerId;
pub use room::RoomName;
pub use session::SessionId;
pub use signaling::{ClientMessage, IceCandidate, IceServerConfig, RoomMember, ServerMessage};
