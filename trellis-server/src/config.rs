use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;
use trellis_core::model::{IceServerConfig, RoomName};

/// Runtime settings, read from the environment with workable defaults
/// for local use.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub video_room: RoomName,
    pub chat_rooms: Vec<RoomName>,
    pub heartbeat: Duration,
    pub ice_servers: Vec<IceServerConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = env::var("SERVER_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.addr = SocketAddr::from(([0, 0, 0, 0], port)),
                Err(e) => warn!("Ignoring invalid SERVER_PORT: {}", e),
            }
        }

        if let Ok(room) = env::var("VIDEO_ROOM") {
            config.video_room = RoomName::from(room);
        }

        if let Ok(rooms) = env::var("CHAT_ROOMS") {
            let rooms: Vec<RoomName> = rooms
                .split(',')
                .map(str::trim)
                .filter(|room| !room.is_empty())
                .map(RoomName::from)
                .collect();
            if !rooms.is_empty() {
                config.chat_rooms = rooms;
            }
        }

        if let Ok(secs) = env::var("HEARTBEAT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.heartbeat = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid HEARTBEAT_SECS: {}", secs),
            }
        }

        if let Ok(stun_url) = env::var("STUN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![stun_url],
                username: None,
                credential: None,
            });
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            video_room: RoomName::from("videoChatRoom"),
            chat_rooms: vec![
                RoomName::from("general"),
                RoomName::from("frontend"),
                RoomName::from("backend"),
            ],
            heartbeat: Duration::from_secs(5),
            ice_servers: Vec::new(),
        }
    }
}
