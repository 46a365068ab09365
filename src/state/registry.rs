//! Room registry: creation, membership, and listing.
//!
//! The registry owns every live room exclusively. The room-code namespace is
//! synchronized through the registry lock so concurrent creations can never
//! collide.

use super::{spawn_question_timer, AppState, RoomHandle};
use crate::error::{GameError, GameResult};
use crate::protocol::{RoomSummary, ServerMessage};
use crate::state::game::Advance;
use crate::types::*;
use rand::Rng;
use std::sync::Arc;

/// Safe character set for short codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const ROOM_CODE_LENGTH: usize = 6;
const PLAYER_ID_LENGTH: usize = 12;

fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

pub(crate) fn generate_player_id() -> PlayerId {
    generate_code(PLAYER_ID_LENGTH)
}

impl AppState {
    /// Create a room with the caller as host (host joins ready).
    ///
    /// The room's questions are snapshotted from the bank here, so later bank
    /// changes cannot affect a session in flight.
    pub async fn create_room(
        &self,
        name: &str,
        is_private: bool,
        category: &str,
        max_players: usize,
        host_name: &str,
    ) -> GameResult<(Arc<RoomHandle>, Player)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::Validation("Room name cannot be empty".into()));
        }
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(GameError::Validation("Username cannot be empty".into()));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(GameError::Validation(format!(
                "maxPlayers must be between {} and {}",
                MIN_PLAYERS, MAX_PLAYERS
            )));
        }

        let questions = self.bank.questions_for_category(category)?;

        let host = Player::new(generate_player_id(), host_name.to_string(), true);

        // Hold the write lock across generate-and-insert so concurrent
        // creations cannot race the collision check
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = generate_code(ROOM_CODE_LENGTH);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            // Collision - try again (extremely rare with ~887M combinations)
        };

        let room = Room::new(
            code.clone(),
            name.to_string(),
            is_private,
            category.to_string(),
            max_players,
            questions,
            host.clone(),
        );
        let handle = Arc::new(RoomHandle::new(room));
        rooms.insert(code.clone(), handle.clone());
        drop(rooms);

        tracing::info!(
            "Room {} created: '{}' ({}, max {})",
            code,
            name,
            category,
            max_players
        );
        Ok((handle, host))
    }

    /// Join a waiting room as a fresh player
    pub async fn join_room(
        &self,
        code: &str,
        username: &str,
    ) -> GameResult<(Arc<RoomHandle>, Player)> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GameError::Validation("Username cannot be empty".into()));
        }

        let handle = self
            .get_room(code)
            .await
            .ok_or_else(|| GameError::NotFound("Room not found".into()))?;

        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(GameError::Conflict("Game already in progress".into()));
        }
        if room.players.len() >= room.max_players {
            return Err(GameError::Capacity("Room is full".into()));
        }

        let player = Player::new(generate_player_id(), username.to_string(), false);
        room.players.insert(player.id.clone(), player.clone());

        tracing::info!(
            "Player {} ({}) joined room {} ({}/{})",
            player.id,
            player.username,
            room.code,
            room.players.len(),
            room.max_players
        );
        handle.broadcast_state(&room);
        drop(room);

        Ok((handle, player))
    }

    /// Remove a player from a room.
    ///
    /// Idempotent: a missing room or player is a no-op. The host leaving
    /// tears the room down in any state; pending timers observe the bumped
    /// generation (or the missing registry entry) and no-op.
    pub async fn leave_room(&self, code: &str, player_id: &str) {
        let Some(handle) = self.get_room(code).await else {
            return;
        };

        let mut room = handle.room.lock().await;
        if !room.players.contains_key(player_id) {
            return;
        }

        if room.host_id == player_id {
            room.timer_gen += 1;
            let code = room.code.clone();
            drop(room);
            self.rooms.write().await.remove(&code);
            let _ = handle.events.send(ServerMessage::RoomClosed {
                room_code: code.clone(),
                reason: "Host left the room".to_string(),
            });
            tracing::info!("Room {} deleted (host left)", code);
            return;
        }

        room.players.remove(player_id);
        tracing::info!("Player {} left room {}", player_id, room.code);

        if room.players.is_empty() {
            room.timer_gen += 1;
            let code = room.code.clone();
            drop(room);
            self.rooms.write().await.remove(&code);
            tracing::info!("Room {} deleted (empty)", code);
            return;
        }

        // The departing member may have been the last one still answering
        if room.status == RoomStatus::InProgress && room.all_answered() {
            match room.advance(&self.config) {
                Advance::Next(gen) => {
                    handle.broadcast_state(&room);
                    drop(room);
                    spawn_question_timer(Arc::downgrade(&handle), self.config.clone(), gen);
                }
                Advance::Completed => handle.broadcast_state(&room),
            }
        } else {
            handle.broadcast_state(&room);
        }
    }

    /// All public rooms still in the lobby, for the browse page
    pub async fn list_public_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<Arc<RoomHandle>> = self.rooms.read().await.values().cloned().collect();

        let mut summaries = Vec::new();
        for handle in handles {
            let room = handle.room.lock().await;
            if room.status == RoomStatus::Waiting && !room.is_private {
                summaries.push(RoomSummary::from(&*room));
            }
        }
        summaries
    }

    /// Delete completed rooms older than `grace`. Returns how many were swept.
    pub async fn sweep_finished_rooms(&self, grace: chrono::Duration) -> usize {
        let handles: Vec<Arc<RoomHandle>> = self.rooms.read().await.values().cloned().collect();
        let cutoff = chrono::Utc::now() - grace;

        let mut swept = 0;
        for handle in handles {
            let mut room = handle.room.lock().await;
            let expired = room.status == RoomStatus::Completed
                && room.completed_at.map(|t| t < cutoff).unwrap_or(false);
            if !expired {
                continue;
            }
            room.timer_gen += 1;
            let code = room.code.clone();
            drop(room);

            self.rooms.write().await.remove(&code);
            let _ = handle.events.send(ServerMessage::RoomClosed {
                room_code: code.clone(),
                reason: "Room expired".to_string(),
            });
            tracing::info!("Room {} swept (completed)", code);
            swept += 1;
        }
        swept
    }
}
