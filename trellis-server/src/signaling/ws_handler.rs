use crate::relay::RelayCommand;
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{error, info, warn};
use trellis_core::model::{ClientMessage, ServerMessage, SessionId};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let session_id = SessionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, session_id, service))
}

async fn handle_socket(socket: WebSocket, session_id: SessionId, service: SignalingService) {
    info!("New signaling connection: {}", session_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_session(session_id.clone(), tx);

    let ice_servers = service.get_ice_servers();
    if !ice_servers.is_empty() {
        service.send(&session_id, &ServerMessage::IceConfig { ice_servers });
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let session_id = session_id.clone();

        async move {
            let heartbeat = service.heartbeat();
            let mut ticker = interval(heartbeat);
            let mut last_heartbeat = Instant::now();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if last_heartbeat.elapsed() > heartbeat * 2 {
                            info!("Session {} missed its heartbeat, disconnecting", session_id);
                            break;
                        }
                        service.ping(&session_id);
                    }

                    frame = receiver.next() => {
                        let Some(Ok(msg)) = frame else { break };
                        last_heartbeat = Instant::now();

                        match msg {
                            Message::Text(text) => {
                                match serde_json::from_str::<ClientMessage>(&text) {
                                    Ok(message) => {
                                        let cmd = RelayCommand::Message {
                                            session_id: session_id.clone(),
                                            message,
                                        };
                                        if let Err(e) = service.relay_cmd_tx.send(cmd).await {
                                            error!("Relay task is gone: {}", e);
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        warn!("Invalid message from {}: {:?}", session_id, e)
                                    }
                                }
                            }
                            Message::Close(_) => break,
                            _ => {}
                        }
                    }
                }
            }

            let _ = service
                .relay_cmd_tx
                .send(RelayCommand::Disconnect {
                    session_id: session_id.clone(),
                })
                .await;
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_session(&session_id);
    info!("Signaling connection closed: {}", session_id);
}
