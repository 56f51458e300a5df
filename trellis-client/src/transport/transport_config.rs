use trellis_core::model::IceServerConfig;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;

/// WebRTC configuration for outgoing mesh connections.
#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Gather host candidates on loopback interfaces as well. Off for
    /// real deployments, needed when both ends live in one process.
    pub include_loopback: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
            include_loopback: false,
        }
    }
}

impl TransportConfig {
    pub(crate) fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = self
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }

    pub(crate) fn setting_engine(&self) -> SettingEngine {
        let mut engine = SettingEngine::default();
        if self.include_loopback {
            engine.set_include_loopback_candidate(true);
        }
        engine
    }
}
