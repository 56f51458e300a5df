use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use trellis_client::{
    DeviceId, DeviceInfo, DeviceSelection, LocalStream, LocalTrack, MediaError, MediaSource,
};
use trellis_core::model::MediaKind;

pub const FRONT_CAMERA: &str = "cam-front";
pub const BACK_CAMERA: &str = "cam-back";
pub const MICROPHONE: &str = "mic-0";

/// Selects the default camera and microphone of the scripted list.
pub fn both_devices() -> DeviceSelection {
    DeviceSelection::both(DeviceId::from(FRONT_CAMERA), DeviceId::from(MICROPHONE))
}

/// Media source backed by a scripted device list. Opening builds real
/// sample tracks, so the streams plug into actual peer connections.
pub struct FakeMediaSource {
    devices: Vec<DeviceInfo>,
    fail_open: AtomicBool,
}

impl FakeMediaSource {
    pub fn new() -> Self {
        Self {
            devices: vec![
                device(FRONT_CAMERA, "Front Camera", MediaKind::Video),
                device(BACK_CAMERA, "Back Camera", MediaKind::Video),
                device(MICROPHONE, "Microphone", MediaKind::Audio),
            ],
            fail_open: AtomicBool::new(false),
        }
    }

    /// Makes every `open` from now on fail with a capture error.
    pub fn fail_opens(&self) {
        self.fail_open.store(true, Ordering::Relaxed);
    }
}

fn device(id: &str, label: &str, kind: MediaKind) -> DeviceInfo {
    DeviceInfo {
        id: DeviceId::from(id),
        label: label.to_owned(),
        kind,
    }
}

#[async_trait]
impl MediaSource for FakeMediaSource {
    async fn list_devices(&self, kind: MediaKind) -> Result<Vec<DeviceInfo>, MediaError> {
        Ok(self
            .devices
            .iter()
            .filter(|device| device.kind == kind)
            .cloned()
            .collect())
    }

    async fn open(
        &self,
        stream_id: &str,
        selection: DeviceSelection,
    ) -> Result<LocalStream, MediaError> {
        if self.fail_open.load(Ordering::Relaxed) {
            return Err(MediaError::Capture("scripted failure".to_owned()));
        }

        let mut stream = LocalStream::new(stream_id);
        for kind in [MediaKind::Video, MediaKind::Audio] {
            let Some(wanted) = selection.wants(kind) else {
                continue;
            };
            let device = self
                .devices
                .iter()
                .find(|device| &device.id == wanted)
                .cloned()
                .ok_or_else(|| MediaError::DeviceNotFound(wanted.clone()))?;
            stream.set_track(LocalTrack::new(device, stream_id));
        }
        Ok(stream)
    }
}
