//! Per-room game loop: lobby, start countdown, question cycle, completion.
//!
//! Timers are spawned tasks holding a `Weak` reference to the room handle and
//! the generation they were armed with. A timer that fires after the room
//! advanced (or was torn down) observes a different generation and no-ops,
//! which resolves the timer-vs-last-answer race deterministically.

use super::{AppState, RoomHandle};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;
use std::sync::{Arc, Weak};

/// Outcome of ending the active question
pub(crate) enum Advance {
    /// Advanced to the next question; the new timer generation to arm with
    Next(u64),
    Completed,
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(duration.as_millis() as i64)
}

impl Room {
    /// Enter `InProgress` at question 0 and open its answer window
    pub(crate) fn begin_questions(&mut self, config: &RoomConfig) -> u64 {
        let now = Utc::now();
        self.status = RoomStatus::InProgress;
        self.current_question_index = 0;
        self.question_started = Some(now);
        self.question_deadline = Some(now + to_chrono(config.question_window));
        for player in self.players.values_mut() {
            player.reset_question_state();
        }
        self.timer_gen += 1;
        self.timer_gen
    }

    /// End the active question: advance by exactly one, or complete the game
    pub(crate) fn advance(&mut self, config: &RoomConfig) -> Advance {
        self.timer_gen += 1;
        if self.current_question_index + 1 < self.questions.len() {
            let now = Utc::now();
            self.current_question_index += 1;
            self.question_started = Some(now);
            self.question_deadline = Some(now + to_chrono(config.question_window));
            for player in self.players.values_mut() {
                player.reset_question_state();
            }
            Advance::Next(self.timer_gen)
        } else {
            self.status = RoomStatus::Completed;
            self.question_started = None;
            self.question_deadline = None;
            self.completed_at = Some(Utc::now());
            Advance::Completed
        }
    }
}

impl AppState {
    /// Toggle a member's ready flag. Only meaningful in the lobby.
    pub async fn set_ready(&self, code: &str, player_id: &str, is_ready: bool) -> GameResult<()> {
        let handle = self
            .get_room(code)
            .await
            .ok_or_else(|| GameError::NotFound("Room not found".into()))?;

        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(GameError::Conflict(
                "Ready status can only change in the lobby".into(),
            ));
        }
        let player = room
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::NotFound("Player not found".into()))?;
        player.is_ready = is_ready;

        handle.broadcast_state(&room);
        Ok(())
    }

    /// Host-only: move the room into the start countdown.
    ///
    /// After the countdown the room enters `InProgress` automatically; the
    /// transition is timer-driven and not cancellable by players.
    pub async fn start_game(&self, code: &str, player_id: &str) -> GameResult<()> {
        let handle = self
            .get_room(code)
            .await
            .ok_or_else(|| GameError::NotFound("Room not found".into()))?;

        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(GameError::Conflict("Game has already started".into()));
        }
        if room.host_id != player_id {
            return Err(GameError::Permission(
                "Only the host can start the game".into(),
            ));
        }

        room.status = RoomStatus::Starting;
        room.starts_at = Some(Utc::now() + to_chrono(self.config.countdown));
        room.timer_gen += 1;
        let gen = room.timer_gen;

        tracing::info!(
            "Room {} starting in {:?} ({} players, {} questions)",
            room.code,
            self.config.countdown,
            room.players.len(),
            room.questions.len()
        );
        handle.broadcast_state(&room);
        drop(room);

        spawn_countdown(Arc::downgrade(&handle), self.config.clone(), gen);
        Ok(())
    }
}

/// One-shot `starting -> in-progress` transition after the lobby countdown
fn spawn_countdown(handle: Weak<RoomHandle>, config: RoomConfig, gen: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(config.countdown).await;

        let Some(handle) = handle.upgrade() else {
            return;
        };
        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::Starting || room.timer_gen != gen {
            tracing::debug!("Room {}: stale countdown timer ignored", handle.code);
            return;
        }

        let next_gen = room.begin_questions(&config);
        tracing::info!("Room {} in progress, question 1", room.code);
        handle.broadcast_state(&room);
        drop(room);

        spawn_question_timer(Arc::downgrade(&handle), config, next_gen);
    });
}

/// Arm the fixed answer window for the active question.
///
/// Fires only if the question it was armed for is still active; the
/// all-answered path bumps the generation when it advances first.
pub fn spawn_question_timer(handle: Weak<RoomHandle>, config: RoomConfig, gen: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(config.question_window).await;

        let Some(handle) = handle.upgrade() else {
            return;
        };
        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::InProgress || room.timer_gen != gen {
            tracing::debug!("Room {}: stale question timer ignored", handle.code);
            return;
        }

        tracing::debug!(
            "Room {}: question {} timed out",
            room.code,
            room.current_question_index
        );
        match room.advance(&config) {
            Advance::Next(next_gen) => {
                handle.broadcast_state(&room);
                drop(room);
                spawn_question_timer(Arc::downgrade(&handle), config, next_gen);
            }
            Advance::Completed => {
                tracing::info!("Room {} completed", room.code);
                handle.broadcast_state(&room);
            }
        }
    });
}
