use crate::chat::{ChatCommand, ChatService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{error, info, warn};
use trellis_core::model::{ChatClientMessage, SessionId};

pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<ChatService>,
) -> impl IntoResponse {
    let session_id = SessionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, session_id, service))
}

async fn handle_socket(socket: WebSocket, session_id: SessionId, service: ChatService) {
    info!("New chat connection: {}", session_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_session(session_id.clone(), tx);

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
                            info!("Chat session {} missed its heartbeat, disconnecting", session_id);
                            break;
                        }
                        service.ping(&session_id);
                    }

                    frame = receiver.next() => {
                        let Some(Ok(msg)) = frame else { break };
                        last_heartbeat = Instant::now();

                        match msg {
                            Message::Text(text) => {
                                match serde_json::from_str::<ChatClientMessage>(&text) {
                                    Ok(message) => {
                                        let cmd = ChatCommand::Message {
                                            session_id: session_id.clone(),
                                            message,
                                        };
                                        if let Err(e) = service.chat_cmd_tx.send(cmd).await {
                                            error!("Chat task is gone: {}", e);
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        warn!("Invalid chat message from {}: {:?}", session_id, e)
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
                .chat_cmd_tx
                .send(ChatCommand::Disconnect {
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
    info!("Chat connection closed: {}", session_id);
}
