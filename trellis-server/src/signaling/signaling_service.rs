use crate::relay::{RelayCommand, RelayOutput};
use crate::signaling::SessionRegistry;
use async_trait::async_trait;
use axum::extract::ws::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use trellis_core::model::{IceServerConfig, ServerMessage, SessionId};

struct SignalingInner {
    sessions: SessionRegistry,
    ice_servers: Vec<IceServerConfig>,
    heartbeat: Duration,
}

/// Cloneable handle tying the socket layer to the relay task: registers
/// per-session outbound channels, serializes relay messages onto them,
/// and carries the relay's command sender for the receive loops.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_cmd_tx: mpsc::Sender<RelayCommand>,
}

impl SignalingService {
    pub fn new(
        relay_cmd_tx: mpsc::Sender<RelayCommand>,
        ice_servers: Vec<IceServerConfig>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                sessions: SessionRegistry::new(),
                ice_servers,
                heartbeat,
            }),
            relay_cmd_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
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

    pub fn send(&self, session_id: &SessionId, msg: &ServerMessage) {
        self.inner.sessions.send(session_id, msg);
    }

    pub fn ping(&self, session_id: &SessionId) {
        self.inner.sessions.ping(session_id);
    }
}

#[async_trait]
impl RelayOutput for SignalingService {
    async fn deliver(&self, session_id: &SessionId, message: ServerMessage) {
        self.send(session_id, &message);
    }
}
