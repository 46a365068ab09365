//! Scoring engine: answer correctness + elapsed time -> point delta.
//!
//! Incorrect answers always score 0. Correct answers scale linearly with the
//! time remaining in the question window: an instant answer earns the
//! maximum, an answer at the window boundary still earns the minimum
//! positive value.

pub const MAX_POINTS: u32 = 100;
pub const MIN_POINTS: u32 = 50;

pub fn score_answer(correct: bool, elapsed_ms: u64, window_ms: u64) -> u32 {
    if !correct {
        return 0;
    }
    if window_ms == 0 {
        return MAX_POINTS;
    }
    let elapsed = elapsed_ms.min(window_ms);
    let remaining = window_ms - elapsed;
    let bonus = (MAX_POINTS - MIN_POINTS) as u64 * remaining / window_ms;
    MIN_POINTS + bonus as u32
}
