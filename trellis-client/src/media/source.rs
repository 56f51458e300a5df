use crate::media::device::{DeviceId, DeviceInfo, DeviceSelection};
use crate::media::stream::LocalStream;
use async_trait::async_trait;
use thiserror::Error;
use trellis_core::model::MediaKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    #[error("capture failed: {0}")]
    Capture(String),
}

/// Where capture tracks come from. A platform backend implements this
/// against real devices; tests substitute a fake with scripted ones.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn list_devices(&self, kind: MediaKind) -> Result<Vec<DeviceInfo>, MediaError>;

    /// Opens the selected devices as fresh capture tracks bound to
    /// `stream_id`. Kinds absent from the selection are not opened.
    async fn open(
        &self,
        stream_id: &str,
        selection: DeviceSelection,
    ) -> Result<LocalStream, MediaError>;
}
