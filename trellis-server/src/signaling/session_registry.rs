use axum::extract::ws::Message;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, warn};
use trellis_core::model::SessionId;

/// Outbound socket channels of every connected session. Shared by the
/// upgrade handlers (which register and deregister) and the relay
/// output path (which writes).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, mpsc::UnboundedSender<Message>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, session_id: SessionId, tx: mpsc::UnboundedSender<Message>) {
        self.sessions.insert(session_id, tx);
    }

    pub fn remove(&self, session_id: &SessionId) {
        self.sessions.remove(session_id);
    }

    pub fn send<M: Serialize>(&self, session_id: &SessionId, msg: &M) {
        if let Some(session) = self.sessions.get(session_id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = session.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", session_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize outbound message: {}", e),
            }
        } else {
            warn!("Attempted to send to disconnected session {}", session_id);
        }
    }

    pub fn ping(&self, session_id: &SessionId) {
        if let Some(session) = self.sessions.get(session_id) {
            let _ = session.send(Message::Ping(Vec::new().into()));
        }
    }
}
