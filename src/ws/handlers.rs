//! WebSocket message dispatch
//!
//! One `Session` per connection tracks which room and player the socket
//! speaks for. Intents are validated by the state layer; the caller gets a
//! direct response while everyone else observes the broadcast snapshot.

use crate::protocol::{ClientMessage, RoomSnapshot, ServerMessage};
use crate::state::AppState;
use crate::types::{PlayerId, RoomCode};
use std::sync::Arc;

/// Per-connection identity: which room and player this socket speaks for
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub room_code: Option<RoomCode>,
    pub player_id: Option<PlayerId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn membership(&self) -> Option<(&str, &str)> {
        match (&self.room_code, &self.player_id) {
            (Some(code), Some(id)) => Some((code.as_str(), id.as_str())),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.room_code = None;
        self.player_id = None;
    }
}

fn not_in_room() -> ServerMessage {
    ServerMessage::Error {
        code: "NOT_IN_ROOM".to_string(),
        msg: "Join a room first".to_string(),
    }
}

/// Handle a client message and return the direct response, if any
pub async fn handle_message(
    msg: ClientMessage,
    session: &mut Session,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom {
            name,
            is_private,
            category,
            max_players,
            username,
        } => {
            if session.membership().is_some() {
                return Some(ServerMessage::Error {
                    code: "CONFLICT".to_string(),
                    msg: "Already in a room".to_string(),
                });
            }
            match state
                .create_room(&name, is_private, &category, max_players, &username)
                .await
            {
                Ok((handle, host)) => {
                    session.room_code = Some(handle.code.clone());
                    session.player_id = Some(host.id.clone());
                    Some(ServerMessage::RoomCreated {
                        room_code: handle.code.clone(),
                        player_id: host.id,
                        snapshot: handle.snapshot().await,
                    })
                }
                Err(e) => Some(e.into_message()),
            }
        }

        ClientMessage::JoinRoom {
            room_code,
            username,
        } => {
            if session.membership().is_some() {
                return Some(ServerMessage::Error {
                    code: "CONFLICT".to_string(),
                    msg: "Already in a room".to_string(),
                });
            }
            match state.join_room(&room_code, &username).await {
                Ok((handle, player)) => {
                    session.room_code = Some(handle.code.clone());
                    session.player_id = Some(player.id.clone());
                    Some(ServerMessage::RoomJoined {
                        player_id: player.id,
                        snapshot: handle.snapshot().await,
                    })
                }
                Err(e) => Some(e.into_message()),
            }
        }

        ClientMessage::LeaveRoom => {
            if let Some((code, player_id)) = session.membership() {
                state.leave_room(code, player_id).await;
            }
            session.clear();
            Some(ServerMessage::LeftRoom)
        }

        ClientMessage::SetReady { is_ready } => {
            let Some((code, player_id)) = session.membership() else {
                return Some(not_in_room());
            };
            match state.set_ready(code, player_id, is_ready).await {
                Ok(()) => None, // result arrives via the snapshot broadcast
                Err(e) => Some(e.into_message()),
            }
        }

        ClientMessage::StartGame => {
            let Some((code, player_id)) = session.membership() else {
                return Some(not_in_room());
            };
            match state.start_game(code, player_id).await {
                Ok(()) => None,
                Err(e) => Some(e.into_message()),
            }
        }

        ClientMessage::SubmitAnswer {
            question_id,
            option_index,
        } => {
            let Some((code, player_id)) = session.membership() else {
                return Some(not_in_room());
            };
            match state
                .submit_answer(code, player_id, &question_id, option_index)
                .await
            {
                Ok(outcome) => Some(ServerMessage::AnswerResult {
                    correct: outcome.correct,
                    points_awarded: outcome.points_awarded,
                    correct_option: outcome.correct_option,
                    explanation: outcome.explanation,
                }),
                Err(e) => Some(e.into_message()),
            }
        }

        ClientMessage::ListRooms => Some(ServerMessage::RoomList {
            rooms: state.list_public_rooms().await,
        }),
    }
}

/// Latest snapshot for the session's room, used on (re)subscription
pub async fn current_snapshot(session: &Session, state: &Arc<AppState>) -> Option<RoomSnapshot> {
    let code = session.room_code.as_deref()?;
    let handle = state.get_room(code).await?;
    Some(handle.snapshot().await)
}
