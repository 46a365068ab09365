//! Answer submission: validation, scoring, the append-only answer log, and
//! the all-answered check that ends a question early.

use super::score::score_answer;
use super::{spawn_question_timer, AppState};
use crate::error::{GameError, GameResult};
use crate::state::game::Advance;
use crate::types::*;
use chrono::Utc;
use std::sync::Arc;

/// What the submitting player gets back. Everyone else observes the snapshot.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points_awarded: u32,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

impl AppState {
    /// Record a player's answer to the active question.
    ///
    /// Accepted only while the room is `in-progress`, only for the question
    /// currently being asked, and only once per player per question - a
    /// second submission is rejected with a conflict, never overwritten.
    pub async fn submit_answer(
        &self,
        code: &str,
        player_id: &str,
        question_id: &str,
        option_index: usize,
    ) -> GameResult<AnswerOutcome> {
        let handle = self
            .get_room(code)
            .await
            .ok_or_else(|| GameError::NotFound("Room not found".into()))?;

        let mut room = handle.room.lock().await;
        if room.status != RoomStatus::InProgress {
            return Err(GameError::Conflict(
                "Answers are only accepted while a question is active".into(),
            ));
        }

        let question = room
            .current_question()
            .cloned()
            .ok_or_else(|| GameError::Conflict("No active question".into()))?;
        if question.id != question_id {
            return Err(GameError::Conflict(
                "That question is no longer active".into(),
            ));
        }
        if option_index >= question.options.len() {
            return Err(GameError::Validation(format!(
                "Option index {} out of range",
                option_index
            )));
        }

        let window_ms = self.config.question_window.as_millis() as u64;
        let elapsed_ms = room
            .question_started
            .map(|started| {
                (Utc::now() - started)
                    .num_milliseconds()
                    .clamp(0, window_ms as i64) as u64
            })
            .unwrap_or(window_ms);

        let player = room
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::NotFound("Player not found in room".into()))?;
        if player.answered_current {
            return Err(GameError::Conflict(
                "Answer already submitted for this question".into(),
            ));
        }

        let correct = option_index == question.correct_option;
        let points = score_answer(correct, elapsed_ms, window_ms);

        player.answered_current = true;
        player.last_answer_correct = Some(correct);
        player.last_answer_ms = Some(elapsed_ms);
        player.score += points;

        room.answer_log.push(AnswerRecord {
            player_id: player_id.to_string(),
            question_id: question.id.clone(),
            option_index,
            correct,
            time_to_answer_ms: elapsed_ms,
        });

        tracing::debug!(
            "Room {}: {} answered question {} ({}, +{} points, {}ms)",
            room.code,
            player_id,
            question.id,
            if correct { "correct" } else { "wrong" },
            points,
            elapsed_ms
        );

        let outcome = AnswerOutcome {
            correct,
            points_awarded: points,
            correct_option: question.correct_option,
            explanation: question.explanation.clone(),
        };

        // Event-driven all-answered check: the question ends early the
        // instant the last member answers
        if room.all_answered() {
            match room.advance(&self.config) {
                Advance::Next(gen) => {
                    handle.broadcast_state(&room);
                    drop(room);
                    spawn_question_timer(Arc::downgrade(&handle), self.config.clone(), gen);
                }
                Advance::Completed => {
                    tracing::info!("Room {} completed", room.code);
                    handle.broadcast_state(&room);
                }
            }
        } else {
            handle.broadcast_state(&room);
        }

        Ok(outcome)
    }
}
