//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, remote control protocol).
//!
//! # Levels
//!
//! | Level | Tiles | Pairs | Countdown |
//! |-------|-------|-------|-----------|
//! | 0 | 12 | 6 | 60s |
//! | 1 | 18 | 9 | 90s |
//! | 2 | 24 | 12 | 120s |
//! | 3 | 32 | 16 | 150s |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `SETTLE_DELAY_MS` | 2000 | Wait after a mismatch before both tiles hide again |
//!
//! # Examples
//!
//! ```
//! use tile_memory_types::{Difficulty, Level, SETTLE_DELAY_MS};
//!
//! let level = Level::from_index(0).unwrap();
//! assert_eq!(level.tile_count(), 12);
//! assert_eq!(level.matches_to_win(), 6);
//! assert_eq!(level.initial_seconds(), 60);
//!
//! let difficulty = Difficulty::from_str("Intermediate").unwrap();
//! assert_eq!(difficulty.index(), 1);
//! assert_eq!(difficulty.as_str(), "intermediate");
//!
//! assert_eq!(SETTLE_DELAY_MS, 2000);
//! ```

use std::fmt;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Delay between a mismatch and both tiles flipping back to hidden.
pub const SETTLE_DELAY_MS: u64 = 2000;

/// Number of selectable levels.
pub const LEVEL_COUNT: u8 = 4;

/// Number of difficulty tiers.
pub const DIFFICULTY_COUNT: u8 = 3;

/// Tiles on the board, indexed by level.
pub const TILE_COUNTS: [usize; LEVEL_COUNT as usize] = [12, 18, 24, 32];

/// Countdown length in seconds, indexed by level.
pub const INITIAL_SECONDS: [u32; LEVEL_COUNT as usize] = [60, 90, 120, 150];

/// Display grid as (rows, columns), indexed by level.
pub const GRID_DIMS: [(usize, usize); LEVEL_COUNT as usize] = [(3, 4), (3, 6), (4, 6), (4, 8)];

/// Error returned when host input names a level or difficulty that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Level(String),
    Difficulty(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Level(v) => write!(f, "invalid level: {} (expected 0-{})", v, LEVEL_COUNT - 1),
            ParseError::Difficulty(v) => write!(
                f,
                "invalid difficulty: {} (expected beginner, intermediate or advanced)",
                v
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Board size tier.
///
/// Internally levels are 0-based; [`Level::display_number`] gives the 1-based
/// number shown to players and sent with score reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    One,
    Two,
    Three,
    Four,
}

impl Level {
    pub const ALL: [Level; LEVEL_COUNT as usize] = [Level::One, Level::Two, Level::Three, Level::Four];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Parse a 0-based level index from host input.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_index)
            .ok_or_else(|| ParseError::Level(s.to_string()))
    }

    pub fn index(&self) -> u8 {
        match self {
            Level::One => 0,
            Level::Two => 1,
            Level::Three => 2,
            Level::Four => 3,
        }
    }

    pub fn display_number(&self) -> u8 {
        self.index() + 1
    }

    pub fn tile_count(&self) -> usize {
        TILE_COUNTS[self.index() as usize]
    }

    pub fn matches_to_win(&self) -> usize {
        self.tile_count() / 2
    }

    pub fn initial_seconds(&self) -> u32 {
        INITIAL_SECONDS[self.index() as usize]
    }

    /// Rows and columns the board is laid out in.
    pub fn grid(&self) -> (usize, usize) {
        GRID_DIMS[self.index() as usize]
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::One
    }
}

/// Difficulty tier; selects which pool of pair keys a board is drawn from and
/// scales the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; DIFFICULTY_COUNT as usize] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Parse difficulty from string (case-insensitive)
    ///
    /// Accepts the tier name or its 0-based index.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_memory_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("beginner"), Some(Difficulty::Beginner));
    /// assert_eq!(Difficulty::from_str("2"), Some(Difficulty::Advanced));
    /// assert_eq!(Difficulty::from_str("expert"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "0" => Some(Difficulty::Beginner),
            "intermediate" | "1" => Some(Difficulty::Intermediate),
            "advanced" | "2" => Some(Difficulty::Advanced),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Self::from_str(s).ok_or_else(|| ParseError::Difficulty(s.to_string()))
    }

    pub fn index(&self) -> u8 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Advanced => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Score multiplier applied on a win.
    pub fn bonus(&self) -> f64 {
        match self {
            Difficulty::Beginner => 1.0,
            Difficulty::Intermediate => 1.15,
            Difficulty::Advanced => 1.3,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Beginner
    }
}

/// Identifier shared by exactly two tiles on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(pub u32);

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which face of a pair a tile shows once revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileRole {
    Image,
    Label,
}

impl TileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileRole::Image => "image",
            TileRole::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileState {
    Hidden,
    Selected,
    Matched,
}

impl TileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileState::Hidden => "hidden",
            TileState::Selected => "selected",
            TileState::Matched => "matched",
        }
    }
}

/// Session lifecycle.
///
/// `Loading -> Playing -> {Won | Lost}`; only a level load or restart returns
/// to `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Loading,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Playing => "playing",
            Phase::Won => "won",
            Phase::Lost => "lost",
        }
    }
}

/// Why a selection was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NotPlaying,
    OutOfRange,
    AlreadySelected,
    AlreadyMatched,
    SelectionFull,
    SettlePending,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotPlaying => "not_playing",
            RejectReason::OutOfRange => "out_of_range",
            RejectReason::AlreadySelected => "already_selected",
            RejectReason::AlreadyMatched => "already_matched",
            RejectReason::SelectionFull => "selection_full",
            RejectReason::SettlePending => "settle_pending",
        }
    }
}

/// Outcome of one `select` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectResult {
    Rejected(RejectReason),
    /// First tile of a pair is face up.
    FirstSelected { index: usize },
    Matched { first: usize, second: usize },
    /// Both tiles stay face up until the settle delay elapses.
    Mismatched { first: usize, second: usize },
}

impl SelectResult {
    pub fn accepted(&self) -> bool {
        !matches!(self, SelectResult::Rejected(_))
    }
}

/// Result record handed to an external score submission collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    pub score: u32,
    pub level: Level,
    pub difficulty: Difficulty,
    /// Seconds since the countdown started, rounded to two decimals.
    pub elapsed_seconds: f64,
}

/// Events emitted by a session for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelLoaded {
        level: Level,
        difficulty: Difficulty,
        epoch: u32,
    },
    TimerStarted { initial_seconds: u32 },
    TileSelected { index: usize },
    PairMatched { first: usize, second: usize },
    PairMismatched { first: usize, second: usize },
    /// Tiles flipped back to hidden (settle elapsed, or a lone pick on loss).
    TilesHidden { indices: Vec<usize> },
    TimerTick { remaining: u32 },
    GameWon { score: u32, best_score: u32 },
    GameLost,
    ResultRecorded(ScoreReport),
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::LevelLoaded { .. } => "level_loaded",
            GameEvent::TimerStarted { .. } => "timer_started",
            GameEvent::TileSelected { .. } => "tile_selected",
            GameEvent::PairMatched { .. } => "pair_matched",
            GameEvent::PairMismatched { .. } => "pair_mismatched",
            GameEvent::TilesHidden { .. } => "tiles_hidden",
            GameEvent::TimerTick { .. } => "timer_tick",
            GameEvent::GameWon { .. } => "game_won",
            GameEvent::GameLost => "game_lost",
            GameEvent::ResultRecorded(_) => "result_recorded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_table_matches_board_sizes() {
        let sizes: Vec<(usize, usize, u32)> = Level::ALL
            .iter()
            .map(|l| (l.tile_count(), l.matches_to_win(), l.initial_seconds()))
            .collect();
        assert_eq!(
            sizes,
            vec![(12, 6, 60), (18, 9, 90), (24, 12, 120), (32, 16, 150)]
        );
        for level in Level::ALL {
            assert_eq!(level.tile_count() % 2, 0);
            let (rows, cols) = level.grid();
            assert_eq!(rows * cols, level.tile_count());
        }
    }

    #[test]
    fn level_parse_rejects_out_of_range() {
        assert_eq!(Level::parse("3"), Ok(Level::Four));
        assert_eq!(Level::parse(" 0 "), Ok(Level::One));
        assert!(Level::parse("4").is_err());
        assert!(Level::parse("-1").is_err());
        assert_eq!(Level::Two.display_number(), 2);
    }

    #[test]
    fn difficulty_names_round_trip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
            assert_eq!(Difficulty::from_index(d.index()), Some(d));
        }
        assert!(Difficulty::parse("expert").is_err());
    }

    #[test]
    fn difficulty_bonus_values() {
        assert_eq!(Difficulty::Beginner.bonus(), 1.0);
        assert_eq!(Difficulty::Intermediate.bonus(), 1.15);
        assert_eq!(Difficulty::Advanced.bonus(), 1.3);
    }

    #[test]
    fn terminal_phases() {
        assert!(Phase::Won.is_terminal());
        assert!(Phase::Lost.is_terminal());
        assert!(!Phase::Playing.is_terminal());
        assert!(!Phase::Loading.is_terminal());
    }
}
