use std::collections::HashMap;

use trellis_core::model::{MediaKind, MediaState, PeerId};

/// Tracks our own mute flags plus the last state each remote peer announced.
#[derive(Debug, Default)]
pub struct MediaStateSync {
    local: MediaState,
    remote: HashMap<PeerId, MediaState>,
}

impl MediaStateSync {
    pub fn new(local: MediaState) -> Self {
        Self {
            local,
            remote: HashMap::new(),
        }
    }

    pub fn local(&self) -> MediaState {
        self.local
    }

    /// Flips one local flag and returns the resulting state.
    pub fn toggle_local(&mut self, kind: MediaKind) -> MediaState {
        match kind {
            MediaKind::Audio => self.local.audio = !self.local.audio,
            MediaKind::Video => self.local.video = !self.local.video,
        }
        self.local
    }

    pub fn apply_remote(&mut self, peer_id: PeerId, media: MediaState) {
        self.remote.insert(peer_id, media);
    }

    /// Seeds a default entry so a peer whose track arrived before its first
    /// media announcement still renders with known flags.
    pub fn note_track(&mut self, peer_id: &PeerId) {
        self.remote.entry(peer_id.clone()).or_default();
    }

    pub fn remote_of(&self, peer_id: &PeerId) -> MediaState {
        self.remote.get(peer_id).copied().unwrap_or_default()
    }

    pub fn drop_peer(&mut self, peer_id: &PeerId) {
        self.remote.remove(peer_id);
    }

    pub fn clear_remote(&mut self) {
        self.remote.clear();
    }
}
