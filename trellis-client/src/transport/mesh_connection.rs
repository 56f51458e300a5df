use crate::media::LocalStream;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{NegotiationState, SessionEvent};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use trellis_core::model::{IceCandidate, MediaKind, PeerId};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("transport failure: {0}")]
    Transport(#[from] webrtc::Error),

    #[error("relay link closed")]
    RelayClosed,

    #[error("mesh loop stopped")]
    Stopped,
}

/// One negotiated transport toward a single remote peer.
///
/// Wraps the `RTCPeerConnection` lifecycle: callbacks push typed
/// `SessionEvent`s into the orchestrator loop, and the handshake steps
/// are thin async methods the loop drives inline. Senders are kept per
/// media kind so a device switch can swap the outgoing track in place.
pub struct MeshConnection {
    pub peer_id: PeerId,
    pub peer_connection: Arc<RTCPeerConnection>,
    state: NegotiationState,
    senders: HashMap<MediaKind, Arc<RTCRtpSender>>,
    pending_candidates: Vec<IceCandidate>,
    remote_description_set: bool,
}

impl MeshConnection {
    /// Builds the peer connection and wires its callbacks to `event_tx`.
    /// `peer_id` is the remote peer every event will be attributed to.
    pub async fn new(
        peer_id: PeerId,
        config: &TransportConfig,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Result<Self, MeshError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .with_setting_engine(config.setting_engine())
            .build();

        let peer_connection = Arc::new(api.new_peer_connection(config.rtc_configuration()).await?);

        let state_tx = event_tx.clone();
        let peer_state = peer_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let peer = peer_state.clone();

                Box::pin(async move {
                    info!("Connection state for peer {}: {:?}", peer, s);
                    let Some(state) = NegotiationState::from_transport(s) else {
                        return;
                    };
                    let _ = tx.send(SessionEvent::StateChanged(peer, state)).await;
                })
            },
        ));

        let candidate_tx = event_tx.clone();
        let peer_candidate = peer_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();
            let peer = peer_candidate.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx.send(SessionEvent::CandidateReady(peer, candidate)).await;
            })
        }));

        let track_tx = event_tx.clone();
        let peer_track = peer_id.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let peer = peer_track.clone();

            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => MediaKind::Audio,
                    RTPCodecType::Video => MediaKind::Video,
                    _ => return,
                };
                debug!(
                    "Remote {:?} track from peer {}: {}",
                    kind,
                    peer,
                    track.codec().capability.mime_type
                );
                let _ = tx.send(SessionEvent::TrackReceived(peer, kind, track)).await;
            })
        }));

        Ok(Self {
            peer_id,
            peer_connection,
            state: NegotiationState::New,
            senders: HashMap::new(),
            pending_candidates: Vec::new(),
            remote_description_set: false,
        })
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn set_state(&mut self, state: NegotiationState) {
        self.state = state;
    }

    /// Adds every track of the local stream to this connection,
    /// remembering one sender per kind for later replacement.
    pub async fn attach_local(&mut self, stream: &LocalStream) -> Result<(), MeshError> {
        for track in stream.tracks() {
            let rtc_track = track.rtc_track() as Arc<dyn TrackLocal + Send + Sync>;
            let sender = self.peer_connection.add_track(rtc_track).await?;
            self.senders.insert(track.kind(), sender);
        }
        Ok(())
    }

    /// Creates the local offer and installs it as the local description.
    pub async fn make_offer(&mut self) -> Result<String, MeshError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        self.state = NegotiationState::Offering;
        Ok(offer.sdp)
    }

    /// Applies a remote offer and produces the answering description.
    pub async fn accept_offer(&mut self, sdp: String) -> Result<String, MeshError> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(offer).await?;
        self.remote_description_set = true;
        self.flush_candidates().await;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        self.state = NegotiationState::Negotiating;
        Ok(answer.sdp)
    }

    /// Applies the remote answer to an offer this side created.
    pub async fn apply_answer(&mut self, sdp: String) -> Result<(), MeshError> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(answer).await?;
        self.remote_description_set = true;
        self.flush_candidates().await;
        self.state = NegotiationState::Negotiating;
        Ok(())
    }

    /// Adds a trickled remote candidate. Candidates arriving before the
    /// remote description are buffered and flushed right after it lands.
    pub async fn add_candidate(&mut self, candidate: IceCandidate) -> Result<(), MeshError> {
        if !self.remote_description_set {
            self.pending_candidates.push(candidate);
            return Ok(());
        }
        self.peer_connection
            .add_ice_candidate(candidate_init(candidate))
            .await?;
        Ok(())
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(error) = self
                .peer_connection
                .add_ice_candidate(candidate_init(candidate))
                .await
            {
                warn!(
                    "Dropping buffered candidate for peer {}: {}",
                    self.peer_id, error
                );
            }
        }
    }

    /// Swaps the outgoing track of one kind in place, no renegotiation.
    /// A connection that never attached that kind is left untouched.
    pub async fn replace_outgoing(
        &self,
        kind: MediaKind,
        track: Arc<TrackLocalStaticSample>,
    ) -> Result<(), MeshError> {
        let Some(sender) = self.senders.get(&kind) else {
            return Ok(());
        };
        sender
            .replace_track(Some(track as Arc<dyn TrackLocal + Send + Sync>))
            .await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<(), MeshError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn candidate_init(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        ..Default::default()
    }
}
