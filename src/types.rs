use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type QuestionId = String;
pub type RoomCode = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A multiple-choice question. Immutable once loaded from the bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Room lifecycle. `Completed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoomStatus {
    Waiting,
    Starting,
    InProgress,
    Completed,
}

/// A member of a room. Owned by the room; rejoining creates a fresh player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub is_ready: bool,
    pub score: u32,
    /// Whether the currently active question has been answered
    pub answered_current: bool,
    pub last_answer_correct: Option<bool>,
    pub last_answer_ms: Option<u64>,
}

impl Player {
    pub fn new(id: PlayerId, username: String, is_ready: bool) -> Self {
        Self {
            id,
            username,
            is_ready,
            score: 0,
            answered_current: false,
            last_answer_correct: None,
            last_answer_ms: None,
        }
    }

    /// Clear the per-question transient fields at the start of a question
    pub fn reset_question_state(&mut self) {
        self.answered_current = false;
        self.last_answer_correct = None;
        self.last_answer_ms = None;
    }
}

/// Append-only audit entry for a single answer submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub option_index: usize,
    pub correct: bool,
    pub time_to_answer_ms: u64,
}

/// Per-room timing knobs. Defaults match the shipped game; tests shorten them.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub countdown: Duration,
    pub question_window: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(5),
            question_window: Duration::from_secs(10),
        }
    }
}

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// An isolated game session. All mutation happens under the room's mutex.
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub name: String,
    pub host_id: PlayerId,
    pub is_private: bool,
    pub category: String,
    pub max_players: usize,
    pub status: RoomStatus,
    pub players: HashMap<PlayerId, Player>,
    /// Questions snapshotted at creation so mid-game bank changes are impossible
    pub questions: Vec<Question>,
    /// Meaningful only once the room has reached `InProgress`
    pub current_question_index: usize,
    pub starts_at: Option<DateTime<Utc>>,
    pub question_started: Option<DateTime<Utc>>,
    pub question_deadline: Option<DateTime<Utc>>,
    pub answer_log: Vec<AnswerRecord>,
    /// Bumped on every timer arm and on teardown; stale timers compare and no-op
    pub timer_gen: u64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(
        code: RoomCode,
        name: String,
        is_private: bool,
        category: String,
        max_players: usize,
        questions: Vec<Question>,
        host: Player,
    ) -> Self {
        let host_id = host.id.clone();
        let mut players = HashMap::new();
        players.insert(host_id.clone(), host);

        Self {
            code,
            name,
            host_id,
            is_private,
            category,
            max_players,
            status: RoomStatus::Waiting,
            players,
            questions,
            current_question_index: 0,
            starts_at: None,
            question_started: None,
            question_deadline: None,
            answer_log: Vec::new(),
            timer_gen: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// The question currently being asked, if the game is running
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == RoomStatus::InProgress {
            self.questions.get(self.current_question_index)
        } else {
            None
        }
    }

    /// True when every current member has answered the active question
    pub fn all_answered(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.answered_current)
    }
}
