use crate::chat::{ChatCommand, ChatOutput};
use crate::signaling::SessionRegistry;
use async_trait::async_trait;
use axum::extract::ws::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use trellis_core::model::{ChatServerMessage, SessionId};

struct ChatInner {
    sessions: SessionRegistry,
    heartbeat: Duration,
}

/// Socket-side handle of the chat loop, a sibling of
/// `SignalingService` on its own route.
#[derive(Clone)]
pub struct ChatService {
    inner: Arc<ChatInner>,
    pub(crate) chat_cmd_tx: mpsc::Sender<ChatCommand>,
}

impl ChatService {
    pub fn new(chat_cmd_tx: mpsc::Sender<ChatCommand>, heartbeat: Duration) -> Self {
        Self {
            inner: Arc::new(ChatInner {
                sessions: SessionRegistry::new(),
                heartbeat,
            }),
            chat_cmd_tx,
        }
    }

    pub fn heartbeat(&self) -> Duration {
        self.inner.heartbeat
    }

    pub fn add_session(&self, session_id: SessionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.sessions.add(session_id, tx);
    }

    pub fn remove_session(&self, session_id: &SessionId) {
        self.inner.sessions.remove(session_id);
    }

    pub fn send(&self, session_id: &SessionId, msg: &ChatServerMessage) {
        self.inner.sessions.send(session_id, msg);
    }

    pub fn ping(&self, session_id: &SessionId) {
        self.inner.sessions.ping(session_id);
    }
}

#[async_trait]
impl ChatOutput for ChatService {
    async fn deliver(&self, session_id: &SessionId, message: ChatServerMessage) {
        self.send(session_id, &message);
    }
}
