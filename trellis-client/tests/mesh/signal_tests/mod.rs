
use anyhow::{Context, Result};
use tokio::sync::mpsc;

use trellis_client::{
    DeviceId, DeviceInfo, LocalStream, LocalTrack, MeshConnection, TransportConfig,
};
use trellis_core::model::{ClientMessage, MediaKind, PeerId, ServerMessage};

use crate::utils::{SIGNAL_TIMEOUT_MS, both_devices, wait_for_snapshot};
use crate::{DirectMesh, spawn_direct_mesh, video_room};

/// A mesh that opened its devices and joined the video room.
pub async fn joined_mesh() -> Result<DirectMesh> {
    let mesh = spawn_direct_mesh();
    let mut snapshots = mesh.snapshots();

    mesh.handle.open_media(both_devices()).await?;
    mesh.handle.join().await?;
    mesh.inject(ServerMessage::Joined { room: video_room() });
    // The injected ack races with the queued commands, so wait for the
    // opened devices too before handing the mesh out.
    if !wait_for_snapshot(&mut snapshots, SIGNAL_TIMEOUT_MS, |s| {
        s.in_room() && s.local_stream.is_some()
    })
    .await
    {
        anyhow::bail!("Timeout waiting for the join ack");
    }
    mesh.sink.clear().await;
    Ok(mesh)
}

/// Announces a newcomer and waits for the offer the mesh sends back.
pub async fn offer_toward(mesh: &DirectMesh, newcomer: &PeerId) -> Result<String> {
    mesh.inject(ServerMessage::PeerJoined {
        room: video_room(),
        peer_id: newcomer.clone(),
    });
    mesh.sink
        .wait_for(SIGNAL_TIMEOUT_MS, |message| match message {
            ClientMessage::Offer { sdp, .. } => Some(sdp.clone()),
            _ => None,
        })
        .await
        .context("No offer sent toward the newcomer")
}

/// A connection configured like the mesh under test, for producing
/// real SDP from the far side.
pub async fn far_side_connection() -> Result<MeshConnection> {
    let (event_tx, _event_rx) = mpsc::channel(64);
    let config = TransportConfig {
        ice_servers: Vec::new(),
        include_loopback: true,
    };
    MeshConnection::new(PeerId::new(), &config, event_tx)
        .await
        .context("Failed to build the far side connection")
}

pub fn far_side_stream() -> LocalStream {
    let mut stream = LocalStream::new("far-side");
    stream.set_track(LocalTrack::new(
        DeviceInfo {
            id: DeviceId::from("far-mic"),
            label: "Far Microphone".to_owned(),
            kind: MediaKind::Audio,
        },
        "far-side",
    ));
    stream
}

/// A fresh, valid offer from a throwaway far-side connection.
pub async fn real_offer() -> Result<String> {
    let mut connection = far_side_connection().await?;
    connection
        .attach_local(&far_side_stream())
        .await
        .context("Failed to attach the far side stream")?;
    connection.make_offer().await.context("Far side offer")
}
