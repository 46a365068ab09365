use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
        is_private: bool,
        category: String,
        max_players: usize,
        username: String,
    },
    JoinRoom {
        room_code: String,
        username: String,
    },
    LeaveRoom,
    SetReady {
        is_ready: bool,
    },
    /// Host-only: begin the start countdown
    StartGame,
    SubmitAnswer {
        question_id: QuestionId,
        option_index: usize,
    },
    ListRooms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        server_now: String,
    },
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
        snapshot: RoomSnapshot,
    },
    RoomJoined {
        player_id: PlayerId,
        snapshot: RoomSnapshot,
    },
    /// Full authoritative snapshot, re-broadcast after every state change
    RoomState {
        snapshot: RoomSnapshot,
    },
    /// Broadcast when a room is torn down (host left or it was swept)
    RoomClosed {
        room_code: RoomCode,
        reason: String,
    },
    LeftRoom,
    /// Sent to the submitting player only; everyone else sees the snapshot
    AnswerResult {
        correct: bool,
        points_awarded: u32,
        correct_option: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Public question view (no correct_option or explanation to prevent spoilers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub category: String,
    pub difficulty: Difficulty,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            category: q.category.clone(),
            difficulty: q.difficulty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub username: String,
    pub is_ready: bool,
    pub score: u32,
    pub has_answered: bool,
    pub last_answer_correct: Option<bool>,
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            username: p.username.clone(),
            is_ready: p.is_ready,
            score: p.score,
            has_answered: p.answered_current,
            last_answer_correct: p.last_answer_correct,
        }
    }
}

/// Full current-state view of a room sent to clients after any change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_code: RoomCode,
    pub name: String,
    pub host_id: PlayerId,
    pub is_private: bool,
    pub category: String,
    pub status: RoomStatus,
    pub player_count: usize,
    pub max_players: usize,
    pub players: Vec<PlayerInfo>,
    pub question_total: usize,
    /// Present once the room has reached `in-progress`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_deadline: Option<String>,
    pub server_now: String,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        let mut players: Vec<PlayerInfo> = room.players.values().map(PlayerInfo::from).collect();
        // Map order is arbitrary; keep the wire form deterministic
        players.sort_by(|a, b| a.id.cmp(&b.id));

        let question_index = match room.status {
            RoomStatus::InProgress | RoomStatus::Completed => Some(room.current_question_index),
            _ => None,
        };

        Self {
            room_code: room.code.clone(),
            name: room.name.clone(),
            host_id: room.host_id.clone(),
            is_private: room.is_private,
            category: room.category.clone(),
            status: room.status,
            player_count: room.players.len(),
            max_players: room.max_players,
            players,
            question_total: room.questions.len(),
            question_index,
            current_question: room.current_question().map(QuestionView::from),
            starts_at: room.starts_at.map(|t| t.to_rfc3339()),
            question_deadline: room.question_deadline.map(|t| t.to_rfc3339()),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Compact listing entry for the browse page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_code: RoomCode,
    pub name: String,
    pub category: String,
    pub host_username: String,
    pub player_count: usize,
    pub max_players: usize,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        let host_username = room
            .players
            .get(&room.host_id)
            .map(|p| p.username.clone())
            .unwrap_or_default();
        Self {
            room_code: room.code.clone(),
            name: room.name.clone(),
            category: room.category.clone(),
            host_username,
            player_count: room.players.len(),
            max_players: room.max_players,
        }
    }
}
