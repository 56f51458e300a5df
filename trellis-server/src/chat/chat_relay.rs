use crate::chat::{ChatRooms, EnterOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use trellis_core::model::{ChatClientMessage, ChatServerMessage, RoomName, SessionId};

#[derive(Debug)]
pub enum ChatCommand {
    Message {
        session_id: SessionId,
        message: ChatClientMessage,
    },
    Disconnect {
        session_id: SessionId,
    },
}

/// Delivery seam for the chat loop, mirroring the relay's.
#[async_trait]
pub trait ChatOutput: Send + Sync {
    async fn deliver(&self, session_id: &SessionId, message: ChatServerMessage);
}

/// Room-scoped text fan-out with no history: messages go to whoever is
/// in the room right now, attributed by session id.
pub struct ChatRelay {
    rooms: ChatRooms,
    command_rx: mpsc::Receiver<ChatCommand>,
    output: Arc<dyn ChatOutput>,
}

impl ChatRelay {
    pub fn new(
        default_rooms: Vec<RoomName>,
        command_rx: mpsc::Receiver<ChatCommand>,
        output: Arc<dyn ChatOutput>,
    ) -> Self {
        Self {
            rooms: ChatRooms::new(default_rooms),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Chat event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Chat event loop finished");
    }

    async fn handle_command(&mut self, cmd: ChatCommand) {
        match cmd {
            ChatCommand::Message {
                session_id,
                message,
            } => match message {
                ChatClientMessage::ListRooms => {
                    self.output
                        .deliver(
                            &session_id,
                            ChatServerMessage::RoomList {
                                rooms: self.rooms.listing(),
                            },
                        )
                        .await;
                }
                ChatClientMessage::Enter { room } => self.handle_enter(session_id, room).await,
                ChatClientMessage::Message { room, text } => {
                    self.handle_message(session_id, room, text).await;
                }
                ChatClientMessage::Leave { room } => {
                    if self.rooms.leave(&room, &session_id) {
                        self.broadcast_left(&room, session_id).await;
                    }
                }
            },
            ChatCommand::Disconnect { session_id } => {
                for room in self.rooms.leave_all(&session_id) {
                    self.broadcast_left(&room, session_id.clone()).await;
                }
            }
        }
    }

    async fn handle_enter(&mut self, session_id: SessionId, room: RoomName) {
        match self.rooms.enter(&room, session_id.clone()) {
            EnterOutcome::UnknownRoom => {
                self.output
                    .deliver(
                        &session_id,
                        ChatServerMessage::Error {
                            message: format!("unknown room: {}", room),
                        },
                    )
                    .await;
            }
            EnterOutcome::AlreadyIn => {
                self.output
                    .deliver(&session_id, ChatServerMessage::Entered { room })
                    .await;
            }
            EnterOutcome::Entered => {
                info!("Session {} entered chat room '{}'", session_id, room);
                self.output
                    .deliver(
                        &session_id,
                        ChatServerMessage::Entered { room: room.clone() },
                    )
                    .await;
                for member in self.rooms.members_of(&room) {
                    if member != session_id {
                        self.output
                            .deliver(
                                &member,
                                ChatServerMessage::PeerEntered {
                                    room: room.clone(),
                                    session_id: session_id.clone(),
                                },
                            )
                            .await;
                    }
                }
            }
        }
    }

    async fn handle_message(&mut self, session_id: SessionId, room: RoomName, text: String) {
        if !self.rooms.is_member(&room, &session_id) {
            debug!("Dropping chat message from non-member {}", session_id);
            return;
        }
        for member in self.rooms.members_of(&room) {
            if member != session_id {
                self.output
                    .deliver(
                        &member,
                        ChatServerMessage::Message {
                            room: room.clone(),
                            sender: session_id.clone(),
                            text: text.clone(),
                        },
                    )
                    .await;
            }
        }
    }

    async fn broadcast_left(&self, room: &RoomName, session_id: SessionId) {
        for member in self.rooms.members_of(room) {
            self.output
                .deliver(
                    &member,
                    ChatServerMessage::PeerLeft {
                        room: room.clone(),
                        session_id: session_id.clone(),
                    },
                )
                .await;
        }
    }
}
