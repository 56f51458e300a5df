use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Whether the camera and microphone tracks are currently enabled, not
/// whether the devices exist. Both default to enabled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct MediaState {
    pub video: bool,
    pub audio: bool,
}

impl MediaState {
    pub fn is_enabled(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.audio,
            MediaKind::Video => self.video,
        }
    }

    pub fn set(&mut self, kind: MediaKind, enabled: bool) {
        match kind {
            MediaKind::Audio => self.audio = enabled,
            MediaKind::Video => self.video = enabled,
        }
    }

    pub fn toggle(&mut self, kind: MediaKind) -> bool {
        let next = !self.is_enabled(kind);
        self.set(kind, next);
        next
    }
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}
