use std::fmt;
use trellis_core::model::MediaKind;

/// Opaque capture device identifier as reported by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(pub String);

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub label: String,
    pub kind: MediaKind,
}

/// Which devices to open, at most one per kind. The switch path asks
/// for a single kind so the other kind's track survives untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    pub video: Option<DeviceId>,
    pub audio: Option<DeviceId>,
}

impl DeviceSelection {
    pub fn both(video: DeviceId, audio: DeviceId) -> Self {
        Self {
            video: Some(video),
            audio: Some(audio),
        }
    }

    pub fn only(kind: MediaKind, device: DeviceId) -> Self {
        match kind {
            MediaKind::Video => Self {
                video: Some(device),
                audio: None,
            },
            MediaKind::Audio => Self {
                video: None,
                audio: Some(device),
            },
        }
    }

    pub fn wants(&self, kind: MediaKind) -> Option<&DeviceId> {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}
