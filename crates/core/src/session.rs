//! Game session - one owned object per player
//!
//! This module ties together the board, selection engine, countdown timer and
//! scheduler. It owns all mutable game state; presentation layers read
//! [`GameSession::snapshot`] and drain [`GameSession::take_events`], and can
//! only change a tile by calling [`GameSession::select`].
//!
//! Every level load bumps the epoch. Scheduled events issued under an older
//! epoch are discarded when they arrive, so a settle or expiry from a previous
//! attempt can never touch the current board.

use crate::board::{Board, BoardError};
use crate::engine::SelectionEngine;
use crate::pool::PairPool;
use crate::rng::SimpleRng;
use crate::schedule::{FireOutcome, ScheduledEvent, ScheduledKind, Scheduler};
use crate::scoring::{calculate_score, BestScore, ScoreStore};
use crate::snapshot::{GameSnapshot, SessionStatus, TileSnapshot};
use crate::timer::CountdownTimer;
use crate::types::*;

/// Construction parameters for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub seed: u32,
    pub pool: PairPool,
    /// An external login context is present: wins produce a [`ScoreReport`].
    pub report_results: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            pool: PairPool::builtin(),
            report_results: false,
        }
    }
}

pub struct GameSession {
    level: Level,
    difficulty: Difficulty,
    phase: Phase,
    board: Board,
    engine: SelectionEngine,
    timer: CountdownTimer,
    timer_started: bool,
    scheduler: Scheduler,
    rng: SimpleRng,
    pool: PairPool,
    /// Monotonic attempt id (increments on every load/restart).
    epoch: u32,
    /// Session clock in ms, advanced only by `tick`.
    clock_ms: u64,
    score: u32,
    best: BestScore,
    store: Box<dyn ScoreStore + Send>,
    store_error: Option<String>,
    report_results: bool,
    last_remaining: u32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session in the `Loading` phase. Call [`GameSession::load_level`]
    /// to start playing.
    pub fn new(config: SessionConfig, store: Box<dyn ScoreStore + Send>) -> Self {
        let best = BestScore::new(store.load_best());
        Self {
            level: Level::default(),
            difficulty: Difficulty::default(),
            phase: Phase::Loading,
            board: Board::from_tiles(Vec::new(), 0),
            engine: SelectionEngine::new(),
            timer: CountdownTimer::new(),
            timer_started: false,
            scheduler: Scheduler::new(),
            rng: SimpleRng::new(config.seed),
            pool: config.pool,
            epoch: 0,
            clock_ms: 0,
            score: 0,
            best,
            store,
            store_error: None,
            report_results: config.report_results,
            last_remaining: 0,
            events: Vec::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pool(&self) -> &PairPool {
        &self.pool
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> Option<u32> {
        self.best.value()
    }

    pub fn moves_made(&self) -> u32 {
        self.engine.moves_made()
    }

    pub fn matches_found(&self) -> usize {
        self.engine.matches_found()
    }

    pub fn matches_to_win(&self) -> usize {
        self.board.pair_count()
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn time_remaining(&self) -> u32 {
        if self.timer_started {
            self.timer.remaining()
        } else {
            self.level.initial_seconds()
        }
    }

    pub fn continue_to_play(&self) -> bool {
        self.phase == Phase::Playing && self.engine.continue_to_play()
    }

    /// Events scheduled for the current epoch, for hosts that drive delays
    /// from their own timers.
    pub fn pending_events(&self) -> &[ScheduledEvent] {
        self.scheduler.pending()
    }

    /// Take all events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take the last best-score persistence failure, if any.
    pub fn take_store_error(&mut self) -> Option<String> {
        self.store_error.take()
    }

    /// Start a fresh attempt at `level`/`difficulty` with a generated board.
    ///
    /// On error nothing changes: the previous board, phase and pending events
    /// stay as they were.
    pub fn load_level(&mut self, level: Level, difficulty: Difficulty) -> Result<(), BoardError> {
        let epoch = self.epoch.wrapping_add(1);
        let board = Board::generate(level, difficulty, &self.pool, &mut self.rng, epoch)?;
        self.install(level, difficulty, board);
        Ok(())
    }

    /// Start a fresh attempt with a fixed layout instead of a generated one.
    pub fn load_layout(
        &mut self,
        level: Level,
        difficulty: Difficulty,
        layout: &[(PairKey, TileRole)],
    ) -> Result<(), BoardError> {
        let epoch = self.epoch.wrapping_add(1);
        let board = Board::from_layout(level, layout, epoch)?;
        self.install(level, difficulty, board);
        Ok(())
    }

    /// Replay the current level and difficulty with a new board.
    pub fn restart(&mut self) -> Result<(), BoardError> {
        self.load_level(self.level, self.difficulty)
    }

    fn install(&mut self, level: Level, difficulty: Difficulty, board: Board) {
        self.epoch = board.epoch();
        self.level = level;
        self.difficulty = difficulty;
        self.board = board;
        self.engine = SelectionEngine::new();
        self.timer.stop();
        self.timer_started = false;
        self.scheduler.cancel_all();
        self.score = 0;
        self.last_remaining = level.initial_seconds();
        self.phase = Phase::Playing;
        self.events.push(GameEvent::LevelLoaded {
            level,
            difficulty,
            epoch: self.epoch,
        });
    }

    /// Try to turn tile `index` face up. Selections outside a valid state are
    /// ignored and reported as [`SelectResult::Rejected`].
    pub fn select(&mut self, index: usize) -> SelectResult {
        if self.phase != Phase::Playing {
            return SelectResult::Rejected(RejectReason::NotPlaying);
        }

        let result = self.engine.select(&mut self.board, index);
        match result {
            SelectResult::Rejected(_) => {}
            SelectResult::FirstSelected { index } => {
                if !self.timer.running() {
                    self.start_timer();
                }
                self.events.push(GameEvent::TileSelected { index });
            }
            SelectResult::Matched { first, second } => {
                self.events.push(GameEvent::TileSelected { index: second });
                self.events.push(GameEvent::PairMatched { first, second });
                if self.engine.matches_found() == self.matches_to_win() {
                    self.win();
                }
            }
            SelectResult::Mismatched { first, second } => {
                self.events.push(GameEvent::TileSelected { index: second });
                self.events.push(GameEvent::PairMismatched { first, second });
                self.scheduler.schedule(
                    self.epoch,
                    self.clock_ms + SETTLE_DELAY_MS,
                    ScheduledKind::MismatchSettle { first, second },
                );
            }
        }
        result
    }

    fn start_timer(&mut self) {
        let initial = self.level.initial_seconds();
        self.timer.start(initial);
        self.timer_started = true;
        self.last_remaining = initial;
        self.scheduler.cancel_where(|k| *k == ScheduledKind::TimerExpire);
        self.scheduler.schedule(
            self.epoch,
            self.clock_ms + u64::from(initial) * 1000,
            ScheduledKind::TimerExpire,
        );
        self.events.push(GameEvent::TimerStarted {
            initial_seconds: initial,
        });
    }

    /// Advance the session clock by `delta_ms`: fire due scheduled events in
    /// order, then update the countdown.
    pub fn tick(&mut self, delta_ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms);

        for event in self.scheduler.take_due(self.clock_ms) {
            self.apply(event);
        }

        if self.phase != Phase::Playing || !self.timer.running() {
            return;
        }

        let reading = self.timer.advance(delta_ms);
        if reading.remaining != self.last_remaining {
            self.last_remaining = reading.remaining;
            self.events.push(GameEvent::TimerTick {
                remaining: reading.remaining,
            });
        }
        if reading.expired {
            self.lose();
        }
    }

    /// Deliver a scheduled event from an external timer.
    ///
    /// Events from an older epoch, or that already fired or were cancelled,
    /// are discarded and reported as [`FireOutcome::Stale`].
    pub fn fire(&mut self, event: ScheduledEvent) -> FireOutcome {
        if event.epoch != self.epoch || !self.scheduler.take(&event) {
            return FireOutcome::Stale;
        }
        self.apply(event);
        FireOutcome::Applied
    }

    fn apply(&mut self, event: ScheduledEvent) {
        if event.epoch != self.epoch {
            return;
        }
        match event.kind {
            ScheduledKind::MismatchSettle { first, second } => {
                if self.engine.settle(&mut self.board, [first, second]) {
                    self.events.push(GameEvent::TilesHidden {
                        indices: vec![first, second],
                    });
                }
            }
            ScheduledKind::TimerExpire => {
                if self.phase == Phase::Playing && self.timer.running() {
                    let initial_ms = u64::from(self.timer.initial_seconds()) * 1000;
                    self.timer.tick(initial_ms);
                    if self.last_remaining != 0 {
                        self.last_remaining = 0;
                        self.events.push(GameEvent::TimerTick { remaining: 0 });
                    }
                    self.lose();
                }
            }
        }
    }

    fn lose(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Lost;
        self.score = 0;
        self.timer.stop();
        self.scheduler.cancel_all();
        self.engine.cancel_settle();
        if let Some(index) = self.engine.hide_lone_selection(&mut self.board) {
            self.events.push(GameEvent::TilesHidden {
                indices: vec![index],
            });
        }
        self.events.push(GameEvent::GameLost);
    }

    fn win(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Won;
        self.timer.stop();
        self.scheduler.cancel_all();

        let remaining = self.timer.remaining();
        self.score = calculate_score(
            remaining,
            self.engine.moves_made(),
            self.matches_to_win(),
            self.difficulty,
        );
        if self.best.record(self.score) {
            if let Err(e) = self.store.save_best(self.score) {
                self.store_error = Some(e.to_string());
            }
        }
        self.events.push(GameEvent::GameWon {
            score: self.score,
            best_score: self.best.value().unwrap_or(self.score),
        });

        if self.report_results {
            let elapsed_seconds = (self.timer.elapsed_ms() as f64 / 10.0).round() / 100.0;
            self.events.push(GameEvent::ResultRecorded(ScoreReport {
                score: self.score,
                level: self.level,
                difficulty: self.difficulty,
                elapsed_seconds,
            }));
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            level: self.level,
            difficulty: self.difficulty,
            phase: self.phase,
            epoch: self.epoch,
            moves_made: self.engine.moves_made(),
            matches_found: self.engine.matches_found(),
            matches_to_win: self.matches_to_win(),
            time_remaining: self.time_remaining(),
            timer_running: self.timer.running(),
            continue_to_play: self.continue_to_play(),
            score: self.score,
            best_score: self.best.value(),
            selection: self.engine.selection().to_vec(),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            status: self.status(),
            tiles: self
                .board
                .tiles()
                .iter()
                .enumerate()
                .map(|(index, t)| TileSnapshot {
                    index,
                    key: t.key,
                    role: t.role,
                    state: t.state,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MemoryScoreStore;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default(), Box::new(MemoryScoreStore::new()))
    }

    /// Keys 1..=6 laid out as image/label neighbours: tiles 2k and 2k+1 match.
    fn paired_layout() -> Vec<(PairKey, TileRole)> {
        (1..=6)
            .flat_map(|k| [(PairKey(k), TileRole::Image), (PairKey(k), TileRole::Label)])
            .collect()
    }

    #[test]
    fn new_session_is_loading() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Loading);
        assert_eq!(
            s.select(0),
            SelectResult::Rejected(RejectReason::NotPlaying)
        );
        assert!(s.board().is_empty());
    }

    #[test]
    fn load_level_resets_and_does_not_start_timer() {
        let mut s = session();
        s.load_level(Level::Two, Difficulty::Advanced).unwrap();
        let st = s.status();
        assert_eq!(st.phase, Phase::Playing);
        assert_eq!(st.matches_to_win, 9);
        assert_eq!(st.moves_made, 0);
        assert_eq!(st.time_remaining, 90);
        assert!(!st.timer_running);
        assert_eq!(st.epoch, 1);
        assert!(s.pending_events().is_empty());

        s.tick(5_000);
        assert_eq!(s.time_remaining(), 90);
    }

    #[test]
    fn first_selection_starts_timer() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.take_events();
        s.select(0);
        assert!(s.status().timer_running);
        let events = s.take_events();
        assert_eq!(
            events,
            vec![
                GameEvent::TimerStarted { initial_seconds: 60 },
                GameEvent::TileSelected { index: 0 },
            ]
        );
        assert_eq!(s.pending_events().len(), 1);
        assert_eq!(s.pending_events()[0].kind, ScheduledKind::TimerExpire);
    }

    #[test]
    fn timer_tick_events_only_on_change() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        s.take_events();
        for _ in 0..62 {
            s.tick(16);
        }
        // 992ms elapsed: ceil(59.008) = 60, no change yet.
        assert!(s.take_events().is_empty());
        s.tick(16);
        assert_eq!(s.take_events(), vec![GameEvent::TimerTick { remaining: 59 }]);
    }

    #[test]
    fn expiry_with_lone_selection_hides_it() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(4);
        s.take_events();
        s.tick(60_000);
        assert_eq!(s.phase(), Phase::Lost);
        assert_eq!(s.score(), 0);
        assert!(s.board().get(4).unwrap().is_hidden());
        let events = s.take_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameLost),
            "loss must be the last event: {:?}",
            events
        );
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::GameLost).count(),
            1
        );
        assert!(events.contains(&GameEvent::TilesHidden { indices: vec![4] }));

        s.tick(60_000);
        assert!(s.take_events().is_empty());
        assert_eq!(
            s.select(0),
            SelectResult::Rejected(RejectReason::NotPlaying)
        );
    }

    #[test]
    fn loss_cancels_pending_settle() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.tick(1);
        s.select(0);
        s.select(1);
        s.tick(58_500);
        s.select(2);
        s.select(5);
        s.take_events();

        s.tick(1_500);
        assert_eq!(s.phase(), Phase::Lost);
        // Game ended before the settle: the pair stays face up.
        assert_eq!(s.board().get(2).unwrap().state, TileState::Selected);
        assert_eq!(s.board().get(5).unwrap().state, TileState::Selected);
        assert!(s.pending_events().is_empty());
        assert!(!s
            .take_events()
            .iter()
            .any(|e| matches!(e, GameEvent::TilesHidden { .. })));
    }

    #[test]
    fn external_fire_applies_once() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        s.select(3);
        let settle = *s
            .pending_events()
            .iter()
            .find(|e| matches!(e.kind, ScheduledKind::MismatchSettle { .. }))
            .unwrap();
        assert_eq!(settle.due_at_ms, SETTLE_DELAY_MS);

        assert_eq!(s.fire(settle), FireOutcome::Applied);
        assert!(s.board().get(0).unwrap().is_hidden());
        assert_eq!(s.fire(settle), FireOutcome::Stale);
        assert!(s.continue_to_play());
    }

    #[test]
    fn external_timer_expire_loses() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        let expire = s.pending_events()[0];
        assert_eq!(s.fire(expire), FireOutcome::Applied);
        assert_eq!(s.phase(), Phase::Lost);
        assert_eq!(s.time_remaining(), 0);
    }

    #[test]
    fn stale_epoch_events_are_discarded() {
        let mut s = session();
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        s.select(3);
        let old: Vec<ScheduledEvent> = s.pending_events().to_vec();
        assert_eq!(old.len(), 2);

        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        s.select(3);
        for e in old {
            assert_eq!(s.fire(e), FireOutcome::Stale);
        }
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.board().get(0).unwrap().state, TileState::Selected);
        assert!(!s.continue_to_play());
    }

    #[test]
    fn failed_load_leaves_session_untouched() {
        let pool = PairPool::new(Vec::new());
        let mut s = GameSession::new(
            SessionConfig {
                pool,
                ..SessionConfig::default()
            },
            Box::new(MemoryScoreStore::new()),
        );
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        s.select(0);
        let before = s.snapshot();
        let err = s.load_level(Level::One, Difficulty::Beginner).unwrap_err();
        assert!(matches!(err, BoardError::InsufficientPool { available: 0, .. }));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn win_stores_best_score() {
        let mut s = GameSession::new(
            SessionConfig::default(),
            Box::new(MemoryScoreStore::with_best(100)),
        );
        assert_eq!(s.best_score(), Some(100));
        s.load_layout(Level::One, Difficulty::Beginner, &paired_layout())
            .unwrap();
        for k in 0..6 {
            s.select(2 * k);
            s.select(2 * k + 1);
        }
        assert_eq!(s.phase(), Phase::Won);
        // 60s left, 6 moves: 60*100/6 * 6 = 6000
        assert_eq!(s.score(), 6000);
        assert_eq!(s.best_score(), Some(6000));
        assert!(s.pending_events().is_empty());
        assert!(!s.status().timer_running);
    }
}
