mod answer;
mod game;
mod registry;
pub mod score;

pub use answer::AnswerOutcome;
pub use game::spawn_question_timer;

use crate::protocol::{RoomSnapshot, ServerMessage};
use crate::questions::QuestionBank;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

/// One live room: its state plus the fan-out channel its members subscribe to.
///
/// The mutex is the room's single-writer guard; every mutating operation
/// (join, leave, ready, start, submit, timer fire) serializes on it.
pub struct RoomHandle {
    pub code: RoomCode,
    pub room: Mutex<Room>,
    pub events: broadcast::Sender<ServerMessage>,
}

impl RoomHandle {
    pub fn new(room: Room) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            code: room.code.clone(),
            room: Mutex::new(room),
            events: tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    /// Fan out an authoritative snapshot to every member connection.
    /// Call with the room lock held so snapshots are never reordered.
    pub fn broadcast_state(&self, room: &Room) {
        let msg = ServerMessage::RoomState {
            snapshot: RoomSnapshot::from(room),
        };
        // No receivers connected is fine
        let _ = self.events.send(msg);
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        let room = self.room.lock().await;
        RoomSnapshot::from(&*room)
    }
}

/// Shared application state
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub rooms: RwLock<HashMap<RoomCode, Arc<RoomHandle>>>,
    pub config: RoomConfig,
}

impl AppState {
    pub fn new(bank: QuestionBank) -> Self {
        Self::with_config(bank, RoomConfig::default())
    }

    pub fn with_config(bank: QuestionBank, config: RoomConfig) -> Self {
        Self {
            bank: Arc::new(bank),
            rooms: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub async fn get_room(&self, code: &str) -> Option<Arc<RoomHandle>> {
        self.rooms.read().await.get(&normalize_code(code)).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Room codes are case-insensitive; uppercase is canonical
pub fn normalize_code(code: &str) -> RoomCode {
    code.trim().to_ascii_uppercase()
}
