use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;
use webrtc::track::track_remote::TrackRemote;

use crate::media::{DeviceId, DeviceSelection, LocalStream, MediaError, MediaSource};
use crate::mesh::media_sync::MediaStateSync;
use crate::mesh::mesh_command::MeshCommand;
use crate::mesh::mesh_snapshot::{MeshSnapshot, PeerView};
use crate::mesh::relay_link::{RelayEvent, RelaySink};
use crate::transport::{MeshConnection, MeshError, NegotiationState, SessionEvent, TransportConfig};
use trellis_core::model::{
    ClientMessage, IceCandidate, MediaKind, PeerId, RoomMember, RoomName, ServerMessage,
};

const COMMAND_BUFFER: usize = 64;
const SESSION_EVENT_BUFFER: usize = 256;

#[derive(Clone)]
pub struct MeshConfig {
    pub transport: TransportConfig,
    /// Stream id every local track is bound to, so remote ends group
    /// our audio and video into one media stream.
    pub stream_id: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            stream_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Cloneable handle the embedding UI drives the mesh through.
#[derive(Clone)]
pub struct MeshHandle {
    command_tx: mpsc::Sender<MeshCommand>,
    snapshot_rx: watch::Receiver<MeshSnapshot>,
}

impl MeshHandle {
    pub async fn join(&self) -> Result<(), MeshError> {
        self.send(MeshCommand::Join).await
    }

    pub async fn leave(&self) -> Result<(), MeshError> {
        self.send(MeshCommand::Leave).await
    }

    pub async fn toggle(&self, kind: MediaKind) -> Result<(), MeshError> {
        self.send(MeshCommand::Toggle(kind)).await
    }

    pub async fn open_media(&self, selection: DeviceSelection) -> Result<(), MeshError> {
        self.send(MeshCommand::OpenMedia(selection)).await
    }

    pub async fn switch_device(&self, kind: MediaKind, device: DeviceId) -> Result<(), MeshError> {
        self.send(MeshCommand::SwitchDevice { kind, device }).await
    }

    async fn send(&self, command: MeshCommand) -> Result<(), MeshError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| MeshError::Stopped)
    }

    /// Current state of the mesh, cloned out of the watch channel.
    pub fn snapshot(&self) -> MeshSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribes to every state change.
    pub fn watch(&self) -> watch::Receiver<MeshSnapshot> {
        self.snapshot_rx.clone()
    }
}

#[derive(Default)]
struct RemoteTracks {
    audio: Option<Arc<TrackRemote>>,
    video: Option<Arc<TrackRemote>>,
}

/// One participant's mesh orchestrator. A single task owns every
/// `MeshConnection`, the local capture stream and the media flags;
/// relay traffic, transport callbacks and UI commands all funnel into
/// its loop, and each change is published as a fresh `MeshSnapshot`.
pub struct Mesh {
    local_peer: PeerId,
    config: MeshConfig,
    relay: Arc<dyn RelaySink>,
    media: Arc<dyn MediaSource>,
    command_rx: mpsc::Receiver<MeshCommand>,
    relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    session_tx: mpsc::Sender<SessionEvent>,
    session_rx: mpsc::Receiver<SessionEvent>,
    room: Option<RoomName>,
    relay_connected: bool,
    connections: HashMap<PeerId, MeshConnection>,
    remote_tracks: HashMap<PeerId, RemoteTracks>,
    members: Arc<Vec<RoomMember>>,
    sync: MediaStateSync,
    stream: Option<LocalStream>,
    capture_error: Option<MediaError>,
    snapshot_tx: watch::Sender<MeshSnapshot>,
}

impl Mesh {
    pub fn new(
        config: MeshConfig,
        relay: Arc<dyn RelaySink>,
        media: Arc<dyn MediaSource>,
        command_rx: mpsc::Receiver<MeshCommand>,
        relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    ) -> (Self, watch::Receiver<MeshSnapshot>) {
        let local_peer = PeerId::new();
        let (session_tx, session_rx) = mpsc::channel(SESSION_EVENT_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(MeshSnapshot::initial(local_peer.clone()));

        let mesh = Self {
            local_peer,
            config,
            relay,
            media,
            command_rx,
            relay_rx,
            session_tx,
            session_rx,
            room: None,
            relay_connected: false,
            connections: HashMap::new(),
            remote_tracks: HashMap::new(),
            members: Arc::new(Vec::new()),
            sync: MediaStateSync::default(),
            stream: None,
            capture_error: None,
            snapshot_tx,
        };
        (mesh, snapshot_rx)
    }

    /// Spawns the mesh loop and returns the handle that drives it.
    pub fn spawn(
        config: MeshConfig,
        relay: Arc<dyn RelaySink>,
        media: Arc<dyn MediaSource>,
        relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    ) -> MeshHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (mesh, snapshot_rx) = Mesh::new(config, relay, media, command_rx, relay_rx);
        tokio::spawn(mesh.run());
        MeshHandle {
            command_tx,
            snapshot_rx,
        }
    }

    pub fn local_peer(&self) -> &PeerId {
        &self.local_peer
    }

    pub async fn run(mut self) {
        info!("Mesh loop started for peer {}", self.local_peer);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!("Command channel closed. Shutting down mesh.");
                        break;
                    };
                    self.handle_command(command).await;
                }

                Some(event) = self.relay_rx.recv() => {
                    self.handle_relay_event(event).await;
                }

                Some(event) = self.session_rx.recv() => {
                    self.handle_session_event(event).await;
                }
            }
        }

        self.close_all().await;
        info!("Mesh loop finished for peer {}", self.local_peer);
    }

    async fn handle_command(&mut self, command: MeshCommand) {
        match command {
            MeshCommand::Join => self.handle_join().await,
            MeshCommand::Leave => self.handle_leave().await,
            MeshCommand::Toggle(kind) => self.handle_toggle(kind).await,
            MeshCommand::OpenMedia(selection) => self.handle_open_media(selection).await,
            MeshCommand::SwitchDevice { kind, device } => {
                self.handle_switch_device(kind, device).await;
            }
        }
    }

    async fn handle_join(&mut self) {
        if self.room.is_some() {
            debug!("Join requested while already in a room; ignored");
            return;
        }
        let message = ClientMessage::Join {
            peer_id: self.local_peer.clone(),
            media: self.sync.local(),
        };
        self.send_to_relay(message).await;
    }

    /// Leaves the room and closes every connection. Safe to call when
    /// not joined; the relay message is only sent if we were.
    async fn handle_leave(&mut self) {
        if let Some(room) = self.room.take() {
            info!("Leaving '{}'", room);
            let message = ClientMessage::Leave {
                room,
                peer_id: self.local_peer.clone(),
            };
            self.send_to_relay(message).await;
        }
        self.close_all().await;
        self.members = Arc::new(Vec::new());
        self.sync.clear_remote();
        self.publish();
    }

    /// Mute is local first: the track flag flips immediately, the
    /// announcement only goes out when we are in a room.
    async fn handle_toggle(&mut self, kind: MediaKind) {
        let media = self.sync.toggle_local(kind);
        if let Some(stream) = &self.stream {
            stream.apply_enabled(media);
        }

        if let Some(room) = self.room.clone() {
            let message = ClientMessage::MediaState {
                room,
                peer_id: self.local_peer.clone(),
                media,
            };
            self.send_to_relay(message).await;
        }
        self.publish();
    }

    async fn handle_open_media(&mut self, selection: DeviceSelection) {
        match self.media.open(&self.config.stream_id, selection).await {
            Ok(stream) => {
                stream.apply_enabled(self.sync.local());
                self.stream = Some(stream);
                self.capture_error = None;
            }
            Err(error) => {
                warn!("Opening capture devices failed: {}", error);
                self.capture_error = Some(error);
            }
        }
        self.publish();
    }

    /// Re-opens one kind from another device and swaps the new track
    /// into every live connection. No renegotiation: the senders keep
    /// their slots and only the track behind them changes.
    async fn handle_switch_device(&mut self, kind: MediaKind, device: DeviceId) {
        let Some(stream_id) = self.stream.as_ref().map(|stream| stream.id.clone()) else {
            self.capture_error = Some(MediaError::Capture(
                "no local stream to switch".to_owned(),
            ));
            self.publish();
            return;
        };

        let selection = DeviceSelection::only(kind, device);
        match self.media.open(&stream_id, selection).await {
            Ok(opened) => {
                opened.apply_enabled(self.sync.local());
                let Some(track) = opened.track(kind).cloned() else {
                    self.capture_error = Some(MediaError::Capture(
                        "source returned no track for the switched kind".to_owned(),
                    ));
                    self.publish();
                    return;
                };

                for connection in self.connections.values() {
                    if let Err(error) = connection.replace_outgoing(kind, track.rtc_track()).await {
                        warn!(
                            "Replacing the {:?} track toward peer {} failed: {}",
                            kind, connection.peer_id, error
                        );
                    }
                }

                if let Some(stream) = &mut self.stream {
                    stream.merge(opened);
                }
                self.capture_error = None;
            }
            Err(error) => {
                warn!("Switching the {:?} device failed: {}", kind, error);
                self.capture_error = Some(error);
            }
        }
        self.publish();
    }

    async fn handle_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Open => {
                self.relay_connected = true;
                self.publish();
            }
            RelayEvent::Closed => {
                info!("Relay link closed");
                self.relay_connected = false;
                self.publish();
            }
            RelayEvent::Message(message) => self.handle_server_message(message).await,
        }
    }

    async fn handle_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::IceConfig { ice_servers } => {
                debug!("Relay supplied {} ICE server entries", ice_servers.len());
                self.config.transport.ice_servers = ice_servers;
            }
            ServerMessage::Joined { room } => {
                info!("Joined '{}' as peer {}", room, self.local_peer);
                self.room = Some(room);
                self.publish();
            }
            ServerMessage::PeerJoined { room, peer_id } => {
                self.handle_peer_joined(room, peer_id).await;
            }
            ServerMessage::MembersChanged { members } => {
                self.members = Arc::new(members);
                self.publish();
            }
            ServerMessage::Offer { peer_id, sdp, .. } => self.handle_offer(peer_id, sdp).await,
            ServerMessage::Answer {
                peer_id,
                target,
                sdp,
            } => self.handle_answer(peer_id, target, sdp).await,
            ServerMessage::IceCandidate {
                peer_id,
                target,
                candidate,
            } => self.handle_candidate(peer_id, target, candidate).await,
            ServerMessage::MediaState { peer_id, media, .. } => {
                self.sync.apply_remote(peer_id, media);
                self.publish();
            }
            ServerMessage::PeerLeft { peer_id } => {
                info!("Peer {} left the room", peer_id);
                self.drop_connection(&peer_id).await;
                self.publish();
            }
        }
    }

    /// A newcomer was announced: the established side opens the
    /// connection and sends the offer.
    async fn handle_peer_joined(&mut self, room: RoomName, peer_id: PeerId) {
        if peer_id == self.local_peer {
            return;
        }
        if self.connections.contains_key(&peer_id) {
            debug!(
                "Peer {} joined again; keeping the existing connection",
                peer_id
            );
            return;
        }

        let mut connection = match MeshConnection::new(
            peer_id.clone(),
            &self.config.transport,
            self.session_tx.clone(),
        )
        .await
        {
            Ok(connection) => connection,
            Err(error) => {
                warn!(
                    "Creating a connection toward peer {} failed: {}",
                    peer_id, error
                );
                return;
            }
        };

        if let Some(stream) = &self.stream {
            if let Err(error) = connection.attach_local(stream).await {
                warn!(
                    "Attaching local tracks toward peer {} failed: {}",
                    peer_id, error
                );
            }
        }

        let sdp = match connection.make_offer().await {
            Ok(sdp) => sdp,
            Err(error) => {
                warn!("Creating an offer toward peer {} failed: {}", peer_id, error);
                let _ = connection.close().await;
                return;
            }
        };

        self.connections.insert(peer_id, connection);
        let message = ClientMessage::Offer {
            room,
            peer_id: self.local_peer.clone(),
            sdp,
        };
        self.send_to_relay(message).await;
        self.publish();
    }

    /// An offer names its sender; we answer it with a fresh connection.
    /// Offers from peers we already track are stray fan-out copies from
    /// a rejoin race and are dropped, the live connection wins.
    async fn handle_offer(&mut self, peer_id: PeerId, sdp: String) {
        if peer_id == self.local_peer {
            return;
        }
        if self.room.is_none() {
            debug!("Offer from peer {} before any join; dropped", peer_id);
            return;
        }
        if self.connections.contains_key(&peer_id) {
            debug!("Stray offer from known peer {} ignored", peer_id);
            return;
        }

        let mut connection = match MeshConnection::new(
            peer_id.clone(),
            &self.config.transport,
            self.session_tx.clone(),
        )
        .await
        {
            Ok(connection) => connection,
            Err(error) => {
                warn!(
                    "Creating a connection toward peer {} failed: {}",
                    peer_id, error
                );
                return;
            }
        };

        if let Some(stream) = &self.stream {
            if let Err(error) = connection.attach_local(stream).await {
                warn!(
                    "Attaching local tracks toward peer {} failed: {}",
                    peer_id, error
                );
            }
        }

        let sdp = match connection.accept_offer(sdp).await {
            Ok(sdp) => sdp,
            Err(error) => {
                warn!("Answering peer {} failed: {}", peer_id, error);
                let _ = connection.close().await;
                return;
            }
        };

        self.connections.insert(peer_id.clone(), connection);
        let message = ClientMessage::Answer {
            peer_id: self.local_peer.clone(),
            target: peer_id,
            sdp,
        };
        self.send_to_relay(message).await;
        self.publish();
    }

    async fn handle_answer(&mut self, peer_id: PeerId, target: PeerId, sdp: String) {
        if target != self.local_peer {
            return;
        }
        let Some(connection) = self.connections.get_mut(&peer_id) else {
            debug!("Answer from unknown peer {}; dropped", peer_id);
            return;
        };
        if connection.state() != NegotiationState::Offering {
            debug!(
                "Answer from peer {} in state {:?}; ignored",
                peer_id,
                connection.state()
            );
            return;
        }
        if let Err(error) = connection.apply_answer(sdp).await {
            warn!("Applying the answer from peer {} failed: {}", peer_id, error);
            self.drop_connection(&peer_id).await;
        }
        self.publish();
    }

    async fn handle_candidate(&mut self, peer_id: PeerId, target: PeerId, candidate: IceCandidate) {
        if target != self.local_peer {
            return;
        }
        let Some(connection) = self.connections.get_mut(&peer_id) else {
            debug!("Candidate from unknown peer {}; dropped", peer_id);
            return;
        };
        if let Err(error) = connection.add_candidate(candidate).await {
            warn!("Adding a candidate from peer {} failed: {}", peer_id, error);
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StateChanged(peer_id, state) => {
                if state.is_terminal() {
                    self.drop_connection(&peer_id).await;
                } else if let Some(connection) = self.connections.get_mut(&peer_id) {
                    connection.set_state(state);
                }
                self.publish();
            }

            SessionEvent::CandidateReady(peer_id, candidate) => {
                // Late candidates of a connection we already dropped.
                if !self.connections.contains_key(&peer_id) {
                    return;
                }
                let message = ClientMessage::IceCandidate {
                    peer_id: self.local_peer.clone(),
                    target: peer_id,
                    candidate,
                };
                self.send_to_relay(message).await;
            }

            SessionEvent::TrackReceived(peer_id, kind, track) => {
                let tracks = self.remote_tracks.entry(peer_id.clone()).or_default();
                match kind {
                    MediaKind::Audio => tracks.audio = Some(track),
                    MediaKind::Video => tracks.video = Some(track),
                }
                self.sync.note_track(&peer_id);
                self.publish();
            }
        }
    }

    async fn drop_connection(&mut self, peer_id: &PeerId) {
        let Some(connection) = self.connections.remove(peer_id) else {
            return;
        };
        info!("Dropping connection toward peer {}", peer_id);
        if let Err(error) = connection.close().await {
            debug!(
                "Closing the connection toward peer {} failed: {}",
                peer_id, error
            );
        }
        self.remote_tracks.remove(peer_id);
        self.sync.drop_peer(peer_id);
    }

    async fn close_all(&mut self) {
        for (peer_id, connection) in self.connections.drain() {
            if let Err(error) = connection.close().await {
                debug!(
                    "Closing the connection toward peer {} failed: {}",
                    peer_id, error
                );
            }
        }
        self.remote_tracks.clear();
    }

    async fn send_to_relay(&mut self, message: ClientMessage) {
        if let Err(error) = self.relay.send(message).await {
            warn!("Relay send failed: {}", error);
            self.relay_connected = false;
        }
    }

    /// Rebuilds and publishes the snapshot. Receivers only see whole,
    /// consistent states.
    fn publish(&self) {
        let mut peers = HashMap::with_capacity(self.connections.len());
        for (peer_id, connection) in &self.connections {
            let tracks = self.remote_tracks.get(peer_id);
            peers.insert(
                peer_id.clone(),
                PeerView {
                    state: connection.state(),
                    media: self.sync.remote_of(peer_id),
                    audio_track: tracks.and_then(|tracks| tracks.audio.clone()),
                    video_track: tracks.and_then(|tracks| tracks.video.clone()),
                },
            );
        }

        let snapshot = MeshSnapshot {
            local_peer: self.local_peer.clone(),
            relay_connected: self.relay_connected,
            room: self.room.clone(),
            local_media: self.sync.local(),
            local_stream: self.stream.clone(),
            capture_error: self.capture_error.clone(),
            peers: Arc::new(peers),
            members: Arc::clone(&self.members),
        };
        let _ = self.snapshot_tx.send(snapshot);
    }
}
