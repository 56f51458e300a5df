use crate::relay::{RelayCommand, RelayOutput, RoomRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use trellis_core::model::{ClientMessage, MediaState, PeerId, RoomName, ServerMessage, SessionId};

/// The signaling relay: one task owning all room state. Commands are
/// processed to completion, broadcasts included, before the next one is
/// picked up, so membership never races.
///
/// The relay forwards setup messages verbatim to every other session in
/// the sender's room and never filters per recipient; clients discard
/// what does not concern them. Any lookup miss drops the message
/// silently.
pub struct Relay {
    video_room: RoomName,
    rooms: RoomRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn RelayOutput>,
}

impl Relay {
    pub fn new(
        video_room: RoomName,
        command_rx: mpsc::Receiver<RelayCommand>,
        output: Arc<dyn RelayOutput>,
    ) -> Self {
        Self {
            video_room,
            rooms: RoomRegistry::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Message {
                session_id,
                message,
            } => match message {
                ClientMessage::Join { peer_id, media } => {
                    self.handle_join(session_id, peer_id, media).await;
                }
                ClientMessage::Offer {
                    room,
                    peer_id,
                    sdp,
                } => {
                    let msg = ServerMessage::Offer {
                        room: room.clone(),
                        peer_id,
                        sdp,
                    };
                    self.forward(&session_id, &room, msg).await;
                }
                ClientMessage::Answer {
                    peer_id,
                    target,
                    sdp,
                } => {
                    let msg = ServerMessage::Answer {
                        peer_id,
                        target,
                        sdp,
                    };
                    self.forward_in_session_room(&session_id, msg).await;
                }
                ClientMessage::IceCandidate {
                    peer_id,
                    target,
                    candidate,
                } => {
                    let msg = ServerMessage::IceCandidate {
                        peer_id,
                        target,
                        candidate,
                    };
                    self.forward_in_session_room(&session_id, msg).await;
                }
                ClientMessage::MediaState {
                    room,
                    peer_id,
                    media,
                } => {
                    self.handle_media_state(session_id, room, peer_id, media)
                        .await;
                }
                ClientMessage::Leave { .. } => self.handle_leave(session_id).await,
            },
            RelayCommand::Disconnect { session_id } => self.handle_leave(session_id).await,
        }
    }

    async fn handle_join(&mut self, session_id: SessionId, peer_id: PeerId, media: MediaState) {
        let room = self.video_room.clone();
        info!("Session {} joins '{}' as peer {}", session_id, room, peer_id);

        // A session that joins again starts over.
        if self.rooms.room_of(&session_id).is_some() {
            self.handle_leave(session_id.clone()).await;
        }

        // A reconnecting participant displaces the session that last
        // held its peer id; the room sees that session leave first.
        if let Some(stale) = self.rooms.evict_identity(&room, &peer_id) {
            debug!("Evicted stale session {} of peer {}", stale, peer_id);
            self.broadcast_departure(&room, peer_id.clone()).await;
        }

        self.rooms
            .join(room.clone(), session_id.clone(), peer_id.clone(), media);

        let others: Vec<SessionId> = self
            .rooms
            .members_of(&room)
            .into_iter()
            .filter(|member| *member != session_id)
            .collect();

        self.output
            .deliver(&session_id, ServerMessage::Joined { room: room.clone() })
            .await;

        for other in &others {
            self.output
                .deliver(
                    other,
                    ServerMessage::PeerJoined {
                        room: room.clone(),
                        peer_id: peer_id.clone(),
                    },
                )
                .await;
        }

        let roster = ServerMessage::MembersChanged {
            members: self.rooms.roster(&room),
        };
        for member in self.rooms.members_of(&room) {
            self.output.deliver(&member, roster.clone()).await;
        }

        for other in &others {
            self.output
                .deliver(
                    other,
                    ServerMessage::MediaState {
                        room: room.clone(),
                        peer_id: peer_id.clone(),
                        media,
                    },
                )
                .await;
        }
    }

    async fn handle_leave(&mut self, session_id: SessionId) {
        let Some(left) = self.rooms.leave(&session_id) else {
            return;
        };
        info!(
            "Session {} left '{}' as peer {}",
            session_id, left.room, left.peer_id
        );
        self.broadcast_departure(&left.room, left.peer_id).await;
    }

    async fn handle_media_state(
        &mut self,
        session_id: SessionId,
        room: RoomName,
        peer_id: PeerId,
        media: MediaState,
    ) {
        if !self.rooms.set_media(&session_id, media) {
            debug!("Media state from unjoined session {}", session_id);
            return;
        }
        let msg = ServerMessage::MediaState {
            room: room.clone(),
            peer_id,
            media,
        };
        self.forward(&session_id, &room, msg).await;
    }

    /// Updated-roster broadcast followed by the departed peer id, to
    /// everyone still in the room.
    async fn broadcast_departure(&self, room: &RoomName, peer_id: PeerId) {
        let members = self.rooms.members_of(room);
        let roster = ServerMessage::MembersChanged {
            members: self.rooms.roster(room),
        };
        for member in &members {
            self.output.deliver(member, roster.clone()).await;
        }
        for member in &members {
            self.output
                .deliver(
                    member,
                    ServerMessage::PeerLeft {
                        peer_id: peer_id.clone(),
                    },
                )
                .await;
        }
    }

    /// Fans `message` out to every member of `room` except the sender.
    /// Senders that are not members are dropped silently.
    async fn forward(&self, session_id: &SessionId, room: &RoomName, message: ServerMessage) {
        if !self.rooms.is_member(room, session_id) {
            debug!("Dropping message from non-member session {}", session_id);
            return;
        }
        for member in self.rooms.members_of(room) {
            if member != *session_id {
                self.output.deliver(&member, message.clone()).await;
            }
        }
    }

    /// Same fan-out, but for messages that name no room: resolved to
    /// whichever room the sender is joined to.
    async fn forward_in_session_room(&self, session_id: &SessionId, message: ServerMessage) {
        let Some(room) = self.rooms.room_of(session_id) else {
            debug!("Dropping message from unjoined session {}", session_id);
            return;
        };
        self.forward(session_id, room, message).await;
    }
}
