use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use trellis_client::{Mesh, MeshConfig, MeshError, MeshHandle, RelayEvent, RelaySink};
use trellis_core::model::{ClientMessage, RoomName, ServerMessage, SessionId};
use trellis_server::{Relay, RelayCommand, RelayOutput};

use crate::utils::FakeMediaSource;

/// In-process wiring of mesh clients to a real relay task: each client
/// is one session, outbound messages become relay commands and
/// deliveries come back as relay events.
pub struct RelayHarness {
    command_tx: mpsc::Sender<RelayCommand>,
    sessions: Arc<Mutex<HashMap<SessionId, mpsc::UnboundedSender<RelayEvent>>>>,
}

impl RelayHarness {
    pub fn new(video_room: RoomName) -> Self {
        let (command_tx, command_rx) = mpsc::channel(100);
        let output = HarnessOutput::default();
        let sessions = Arc::clone(&output.sessions);

        let relay = Relay::new(video_room, command_rx, Arc::new(output));
        tokio::spawn(relay.run());

        Self {
            command_tx,
            sessions,
        }
    }

    /// Attaches one mesh client as a relay session and spawns its loop.
    pub async fn spawn_client(&self, config: MeshConfig) -> (SessionId, MeshHandle) {
        let session_id = SessionId::new();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.sessions
            .lock()
            .await
            .insert(session_id.clone(), event_tx.clone());

        let sink = HarnessSink {
            session_id: session_id.clone(),
            command_tx: self.command_tx.clone(),
        };
        let handle = Mesh::spawn(
            config,
            Arc::new(sink),
            Arc::new(FakeMediaSource::new()),
            event_rx,
        );
        let _ = event_tx.send(RelayEvent::Open);

        (session_id, handle)
    }

    /// Severs one session the way a dropped socket would.
    pub async fn disconnect(&self, session_id: &SessionId) {
        if let Some(events) = self.sessions.lock().await.remove(session_id) {
            let _ = events.send(RelayEvent::Closed);
        }
        let _ = self
            .command_tx
            .send(RelayCommand::Disconnect {
                session_id: session_id.clone(),
            })
            .await;
    }
}

#[derive(Clone, Default)]
struct HarnessOutput {
    sessions: Arc<Mutex<HashMap<SessionId, mpsc::UnboundedSender<RelayEvent>>>>,
}

#[async_trait]
impl RelayOutput for HarnessOutput {
    async fn deliver(&self, session_id: &SessionId, message: ServerMessage) {
        let sessions = self.sessions.lock().await;
        let Some(events) = sessions.get(session_id) else {
            return;
        };
        let _ = events.send(RelayEvent::Message(message));
    }
}

/// Outbound half of one harness session.
struct HarnessSink {
    session_id: SessionId,
    command_tx: mpsc::Sender<RelayCommand>,
}

#[async_trait]
impl RelaySink for HarnessSink {
    async fn send(&self, message: ClientMessage) -> Result<(), MeshError> {
        self.command_tx
            .send(RelayCommand::Message {
                session_id: self.session_id.clone(),
                message,
            })
            .await
            .map_err(|_| MeshError::RelayClosed)
    }
}
