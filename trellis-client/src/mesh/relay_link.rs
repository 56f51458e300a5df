use crate::transport::MeshError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use trellis_core::model::{ClientMessage, ServerMessage};

/// What the relay connection reports into the mesh loop.
#[derive(Debug)]
pub enum RelayEvent {
    Open,
    Message(ServerMessage),
    Closed,
}

/// Outbound path to the relay. The socket transport implements this;
/// tests plug in a recording sink the same way.
#[async_trait]
pub trait RelaySink: Send + Sync {
    async fn send(&self, message: ClientMessage) -> Result<(), MeshError>;
}

#[async_trait]
impl RelaySink for mpsc::UnboundedSender<ClientMessage> {
    async fn send(&self, message: ClientMessage) -> Result<(), MeshError> {
        mpsc::UnboundedSender::send(self, message).map_err(|_| MeshError::RelayClosed)
    }
}
