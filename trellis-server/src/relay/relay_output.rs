use async_trait::async_trait;
use trellis_core::model::{ServerMessage, SessionId};

/// Delivery seam the relay task pushes outbound messages through, so
/// the socket layer (or a recording mock in tests) can be swapped in.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    async fn deliver(&self, session_id: &SessionId, message: ServerMessage);
}
