//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the game rules, state management, and scheduling for the
//! tile memory game. It has **zero dependencies** on rendering, audio, networking,
//! or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical boards
//! - **Testable**: Time only moves when the host says so
//! - **Portable**: Can run behind a terminal, a browser bridge, or a test harness
//!
//! # Module Structure
//!
//! - [`pool`]: Catalogue of pair keys tagged by difficulty
//! - [`board`]: Board generation (draw without replacement, shuffle) and tiles
//! - [`timer`]: Countdown timer that reports expiry exactly once
//! - [`engine`]: Selection & match state machine
//! - [`schedule`]: Epoch-tagged deferred events (mismatch settle, timer expiry)
//! - [`scoring`]: Win score formula, best-score high-water mark, score store trait
//! - [`session`]: One owned game session composing all of the above
//! - [`snapshot`]: Read-only views for presentation layers
//! - [`rng`]: Seedable random source
//!
//! # Game Rules
//!
//! - Four levels: 12, 18, 24 or 32 tiles with 60, 90, 120 or 150 seconds
//! - Each pair is one image tile and one label tile sharing a key
//! - The countdown starts on the first tile selection, not on level load
//! - A mismatched pair stays face up for 2000ms; no selection is accepted meanwhile
//! - Matching every pair wins; running out of time loses with a score of 0
//!
//! # Example
//!
//! ```
//! use tile_memory_core::{GameSession, MemoryScoreStore, SessionConfig};
//! use tile_memory_types::{Difficulty, Level, Phase};
//!
//! let mut session = GameSession::new(SessionConfig::default(), Box::new(MemoryScoreStore::new()));
//! session.load_level(Level::One, Difficulty::Beginner).unwrap();
//! assert_eq!(session.board().len(), 12);
//!
//! // Pick a tile and its partner.
//! let partner = session.board().partner_of(0).unwrap();
//! session.select(0);
//! session.select(partner);
//! assert_eq!(session.matches_found(), 1);
//! assert_eq!(session.moves_made(), 1);
//! assert_eq!(session.phase(), Phase::Playing);
//! ```
//!
//! # Timing
//!
//! The host calls [`GameSession::tick`](session::GameSession::tick) with elapsed
//! milliseconds (every 16ms frame in the terminal front-end). Hosts that prefer
//! their own timers read [`GameSession::pending_events`](session::GameSession::pending_events)
//! and deliver each one back through [`GameSession::fire`](session::GameSession::fire).

pub mod board;
pub mod engine;
pub mod pool;
pub mod rng;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod timer;

pub use tile_memory_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, Tile};
pub use engine::{EngineState, SelectionEngine};
pub use pool::{PairEntry, PairPool};
pub use rng::{RandomSource, SimpleRng};
pub use schedule::{FireOutcome, ScheduledEvent, ScheduledKind, Scheduler};
pub use scoring::{calculate_score, BestScore, MemoryScoreStore, ScoreStore};
pub use session::{GameSession, SessionConfig};
pub use snapshot::{GameSnapshot, SessionStatus, TileSnapshot};
pub use timer::{CountdownTimer, TimerReading};
