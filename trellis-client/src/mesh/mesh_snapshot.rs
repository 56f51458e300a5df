use std::collections::HashMap;
use std::sync::Arc;

use webrtc::track::track_remote::TrackRemote;

use crate::media::{LocalStream, MediaError};
use crate::transport::NegotiationState;
use trellis_core::model::{MediaState, PeerId, RoomMember, RoomName};

/// Everything the UI needs to render one remote participant.
#[derive(Clone)]
pub struct PeerView {
    pub state: NegotiationState,
    pub media: MediaState,
    pub audio_track: Option<Arc<TrackRemote>>,
    pub video_track: Option<Arc<TrackRemote>>,
}

/// Point-in-time view of the whole mesh, published over a watch channel.
///
/// Cloning is cheap: the per-peer map and member list are behind `Arc`s
/// that are swapped wholesale on every change.
#[derive(Clone)]
pub struct MeshSnapshot {
    pub local_peer: PeerId,
    pub relay_connected: bool,
    pub room: Option<RoomName>,
    pub local_media: MediaState,
    pub local_stream: Option<LocalStream>,
    pub capture_error: Option<MediaError>,
    pub peers: Arc<HashMap<PeerId, PeerView>>,
    pub members: Arc<Vec<RoomMember>>,
}

impl MeshSnapshot {
    pub(crate) fn initial(local_peer: PeerId) -> Self {
        Self {
            local_peer,
            relay_connected: false,
            room: None,
            local_media: MediaState::default(),
            local_stream: None,
            capture_error: None,
            peers: Arc::new(HashMap::new()),
            members: Arc::new(Vec::new()),
        }
    }

    pub fn peer(&self, peer_id: &PeerId) -> Option<&PeerView> {
        self.peers.get(peer_id)
    }

    /// Peers whose transport has finished connecting.
    pub fn connected_peers(&self) -> impl Iterator<Item = &PeerId> {
        self.peers
            .iter()
            .filter(|(_, view)| view.state == NegotiationState::Connected)
            .map(|(peer_id, _)| peer_id)
    }

    pub fn in_room(&self) -> bool {
        self.room.is_some()
    }
}
