pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use handlers::Session;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// The connection subscribes to its room's broadcast channel once the client
/// joins or creates a room, and drops the subscription on leave. Closing the
/// socket counts as leaving the room.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::new();
    let mut room_rx: Option<broadcast::Receiver<ServerMessage>> = None;

    tracing::info!("WebSocket connected");

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    loop {
        tokio::select! {
            // Room snapshot broadcasts, once subscribed
            broadcast_msg = async {
                match &mut room_rx {
                    Some(rx) => Some(rx.recv().await),
                    None => {
                        // Not in a room: wait forever
                        std::future::pending::<Option<Result<ServerMessage, broadcast::error::RecvError>>>().await
                    }
                }
            } => {
                match broadcast_msg {
                    Some(Ok(msg)) => {
                        // The server tore the room down; this session is over
                        let closed = matches!(msg, ServerMessage::RoomClosed { .. });
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        if closed {
                            session = Session::new();
                            room_rx = None;
                        }
                    }
                    Some(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                        // Snapshots are self-contained, so skipping stale ones
                        // and sending the latest keeps the client consistent
                        tracing::warn!("Connection lagged, skipped {} snapshots", skipped);
                        if let Some(snapshot) = handlers::current_snapshot(&session, &state).await {
                            let msg = ServerMessage::RoomState { snapshot };
                            if let Ok(json) = serde_json::to_string(&msg) {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(broadcast::error::RecvError::Closed)) | None => {
                        session = Session::new();
                        room_rx = None;
                    }
                }
            }

            // Client intents
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let was_in_room = session.room_code.clone();
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &mut session, &state).await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            tracing::error!("Failed to send response");
                                            break;
                                        }
                                    }
                                }

                                // (Re)wire the room subscription if membership changed
                                if session.room_code != was_in_room {
                                    room_rx = match &session.room_code {
                                        Some(code) => state
                                            .get_room(code)
                                            .await
                                            .map(|handle| handle.subscribe()),
                                        None => None,
                                    };
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // A dropped connection counts as leaving the room
    if let (Some(code), Some(player_id)) = (&session.room_code, &session.player_id) {
        state.leave_room(code, player_id).await;
    }

    tracing::info!("WebSocket connection closed");
}
