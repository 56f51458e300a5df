use std::sync::Arc;
use trellis_core::model::{IceCandidate, MediaKind, PeerId};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_remote::TrackRemote;

/// Lifecycle of one mesh connection. The first three are driven by the
/// signaling handshake, the rest by the transport itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    Offering,
    Negotiating,
    Connected,
    Failed,
    Closed,
}

impl NegotiationState {
    /// Maps the transport states the orchestrator reacts to. Early
    /// states (New/Connecting) stay with the handshake-driven value.
    pub fn from_transport(state: RTCPeerConnectionState) -> Option<Self> {
        match state {
            RTCPeerConnectionState::Connected => Some(NegotiationState::Connected),
            RTCPeerConnectionState::Failed | RTCPeerConnectionState::Disconnected => {
                Some(NegotiationState::Failed)
            }
            RTCPeerConnectionState::Closed => Some(NegotiationState::Closed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Failed | NegotiationState::Closed)
    }
}

/// Events a mesh connection pushes into the orchestrator loop.
pub enum SessionEvent {
    StateChanged(PeerId, NegotiationState),
    CandidateReady(PeerId, IceCandidate),
    TrackReceived(PeerId, MediaKind, Arc<TrackRemote>),
}
