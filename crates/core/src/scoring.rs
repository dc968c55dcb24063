//! Scoring module - final score on a win and the best-score high-water mark
//!
//! Score formula:
//!
//! ```text
//! score = round((time_remaining * 100 / moves_made) * matches_to_win * bonus)
//! ```
//!
//! where `bonus` is 1.0 / 1.15 / 1.3 for beginner / intermediate / advanced.
//! A loss always scores 0.

use std::io;

use crate::types::Difficulty;

/// Score for a won attempt.
///
/// `moves_made` is at least 1 for any real win; 0 is treated as 1 so the
/// function is total.
pub fn calculate_score(
    time_remaining: u32,
    moves_made: u32,
    matches_to_win: usize,
    difficulty: Difficulty,
) -> u32 {
    let moves = f64::from(moves_made.max(1));
    let per_move = f64::from(time_remaining) * 100.0 / moves;
    let raw = per_move * matches_to_win as f64 * difficulty.bonus();
    raw.round() as u32
}

/// Persistence boundary for the single best-score value.
///
/// The core reads the current value to compare and writes a new one; where and
/// how it is stored belongs to the implementation.
pub trait ScoreStore {
    fn load_best(&self) -> Option<u32>;
    fn save_best(&mut self, score: u32) -> io::Result<()>;
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Option<u32>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        Self { best: Some(best) }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best(&self) -> Option<u32> {
        self.best
    }

    fn save_best(&mut self, score: u32) -> io::Result<()> {
        self.best = Some(score);
        Ok(())
    }
}

/// Monotonic best score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore {
    value: Option<u32>,
}

impl BestScore {
    pub fn new(value: Option<u32>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// Record `score`; returns true if it became the new best.
    ///
    /// The first score ever recorded always becomes the best, even 0.
    pub fn record(&mut self, score: u32) -> bool {
        match self.value {
            Some(best) if best >= score => false,
            _ => {
                self.value = Some(score);
                true
            }
        }
    }
}
