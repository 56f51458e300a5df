use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use trellis_core::model::{ChatServerMessage, ServerMessage, SessionId};
use trellis_server::{ChatOutput, RelayOutput};

/// Mock RelayOutput that records every delivery for verification.
#[derive(Clone, Default)]
pub struct MockRelayOutput {
    deliveries: Arc<Mutex<Vec<(SessionId, ServerMessage)>>>,
}

impl MockRelayOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery so far, in relay processing order.
    pub async fn deliveries(&self) -> Vec<(SessionId, ServerMessage)> {
        self.deliveries.lock().await.clone()
    }

    /// Everything delivered to one session, in order.
    pub async fn messages_for(&self, session_id: &SessionId) -> Vec<ServerMessage> {
        self.deliveries
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == session_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Wait for the total delivery count to reach `count` with timeout.
    pub async fn wait_for_deliveries(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.deliveries.lock().await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Wait until one session has received `count` messages.
    pub async fn wait_for_session(
        &self,
        session_id: &SessionId,
        count: usize,
        timeout_ms: u64,
    ) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.messages_for(session_id).await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    /// Forget everything recorded so far, to isolate a test phase.
    pub async fn clear(&self) {
        self.deliveries.lock().await.clear();
    }
}

#[async_trait]
impl RelayOutput for MockRelayOutput {
    async fn deliver(&self, session_id: &SessionId, message: ServerMessage) {
        tracing::debug!("[MockRelayOutput] deliver to {}: {:?}", session_id, message);
        self.deliveries
            .lock()
            .await
            .push((session_id.clone(), message));
    }
}

/// Mock ChatOutput, same recording scheme as MockRelayOutput.
#[derive(Clone, Default)]
pub struct MockChatOutput {
    deliveries: Arc<Mutex<Vec<(SessionId, ChatServerMessage)>>>,
}

impl MockChatOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<(SessionId, ChatServerMessage)> {
        self.deliveries.lock().await.clone()
    }

    pub async fn messages_for(&self, session_id: &SessionId) -> Vec<ChatServerMessage> {
        self.deliveries
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == session_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn wait_for_deliveries(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.deliveries.lock().await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn wait_for_session(
        &self,
        session_id: &SessionId,
        count: usize,
        timeout_ms: u64,
    ) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.messages_for(session_id).await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn clear(&self) {
        self.deliveries.lock().await.clear();
    }
}

#[async_trait]
impl ChatOutput for MockChatOutput {
    async fn deliver(&self, session_id: &SessionId, message: ChatServerMessage) {
        tracing::debug!("[MockChatOutput] deliver to {}: {:?}", session_id, message);
        self.deliveries
            .lock()
            .await
            .push((session_id.clone(), message));
    }
}
