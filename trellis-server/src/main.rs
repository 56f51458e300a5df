use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};
use trellis_server::{
    ChatRelay, ChatService, Relay, ServerConfig, SignalingService, chat_ws_handler, ws_handler,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Initializing relay server...");

    let config = ServerConfig::from_env();

    let (relay_tx, relay_rx) = mpsc::channel(256);
    let signaling = SignalingService::new(relay_tx, config.ice_servers.clone(), config.heartbeat);
    let relay = Relay::new(
        config.video_room.clone(),
        relay_rx,
        Arc::new(signaling.clone()),
    );
    tokio::spawn(relay.run());

    let (chat_tx, chat_rx) = mpsc::channel(256);
    let chat = ChatService::new(chat_tx, config.heartbeat);
    let chat_relay = ChatRelay::new(config.chat_rooms.clone(), chat_rx, Arc::new(chat.clone()));
    tokio::spawn(chat_relay.run());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/signal", get(ws_handler))
        .with_state(signaling)
        .merge(
            Router::new()
                .route("/chat", get(chat_ws_handler))
                .with_state(chat),
        )
        .layer(cors);

    info!("Relay server listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
