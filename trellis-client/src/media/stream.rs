use crate::media::device::DeviceInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use trellis_core::model::{MediaKind, MediaState};
use uuid::Uuid;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One local capture track plus the shared enabled flag the mute path
/// flips. Clones share both the track and the flag.
#[derive(Clone)]
pub struct LocalTrack {
    track: Arc<TrackLocalStaticSample>,
    enabled: Arc<AtomicBool>,
    device: DeviceInfo,
}

impl LocalTrack {
    /// Builds a sample track for the device's kind: Opus at 48kHz for
    /// microphones, VP8 at 90kHz for cameras.
    pub fn new(device: DeviceInfo, stream_id: &str) -> Self {
        let capability = match device.kind {
            MediaKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            MediaKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        };
        let track = Arc::new(TrackLocalStaticSample::new(
            capability,
            Uuid::new_v4().to_string(),
            stream_id.to_owned(),
        ));

        Self {
            track,
            enabled: Arc::new(AtomicBool::new(true)),
            device,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.device.kind
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn rtc_track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

/// The local capture stream: one id, at most one track per kind.
#[derive(Clone)]
pub struct LocalStream {
    pub id: String,
    pub video: Option<LocalTrack>,
    pub audio: Option<LocalTrack>,
}

impl LocalStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            video: None,
            audio: None,
        }
    }

    pub fn track(&self, kind: MediaKind) -> Option<&LocalTrack> {
        match kind {
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    pub fn set_track(&mut self, track: LocalTrack) {
        match track.kind() {
            MediaKind::Audio => self.audio = Some(track),
            MediaKind::Video => self.video = Some(track),
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &LocalTrack> {
        self.video.iter().chain(self.audio.iter())
    }

    /// Overlays `other`'s tracks kind by kind, keeping whatever `other`
    /// did not open. The switch path merges a single-kind stream this
    /// way so the untouched kind carries over.
    pub fn merge(&mut self, other: LocalStream) {
        if let Some(track) = other.video {
            self.video = Some(track);
        }
        if let Some(track) = other.audio {
            self.audio = Some(track);
        }
    }

    /// Pushes the enabled flags onto whichever tracks exist.
    pub fn apply_enabled(&self, media: MediaState) {
        if let Some(track) = &self.video {
            track.set_enabled(media.video);
        }
        if let Some(track) = &self.audio {
            track.set_enabled(media.audio);
        }
    }
}
