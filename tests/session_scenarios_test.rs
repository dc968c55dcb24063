//! End-to-end game scenarios driven through the facade crate.

use tile_memory::core::{
    FireOutcome, GameSession, MemoryScoreStore, ScheduledKind, ScoreStore, SessionConfig,
};
use tile_memory::types::{
    Difficulty, GameEvent, Level, PairKey, Phase, RejectReason, SelectResult, TileRole, TileState,
};

fn session() -> GameSession {
    GameSession::new(SessionConfig::default(), Box::new(MemoryScoreStore::new()))
}

/// Keys laid out as image/label neighbours: tiles 2n and 2n+1 share a key.
fn layout(keys: &[u32]) -> Vec<(PairKey, TileRole)> {
    keys.iter()
        .flat_map(|&k| [(PairKey(k), TileRole::Image), (PairKey(k), TileRole::Label)])
        .collect()
}

fn state_of(s: &GameSession, index: usize) -> TileState {
    s.snapshot().tiles[index].state
}

#[test]
fn match_then_mismatch_settles_after_exactly_two_seconds() {
    let mut s = session();
    s.load_layout(Level::One, Difficulty::Beginner, &layout(&[1, 2, 3, 5, 7, 9]))
        .unwrap();

    // Tiles 4 and 5 carry key 3.
    assert!(matches!(s.select(4), SelectResult::FirstSelected { index: 4 }));
    assert_eq!(
        s.select(5),
        SelectResult::Matched {
            first: 4,
            second: 5
        }
    );
    assert_eq!(s.matches_found(), 1);
    assert_eq!(s.moves_made(), 1);

    // Key 5 (tile 6) against key 7 (tile 8).
    s.select(6);
    assert_eq!(
        s.select(8),
        SelectResult::Mismatched {
            first: 6,
            second: 8
        }
    );
    assert_eq!(s.moves_made(), 2);
    assert_eq!(
        s.select(0),
        SelectResult::Rejected(RejectReason::SettlePending)
    );

    s.take_events();
    s.tick(1_999);
    assert_eq!(state_of(&s, 6), TileState::Selected);
    assert_eq!(state_of(&s, 8), TileState::Selected);

    s.tick(1);
    assert_eq!(state_of(&s, 6), TileState::Hidden);
    assert_eq!(state_of(&s, 8), TileState::Hidden);
    assert!(s
        .take_events()
        .contains(&GameEvent::TilesHidden { indices: vec![6, 8] }));

    // The matched pair is untouched and play continues.
    assert_eq!(state_of(&s, 4), TileState::Matched);
    assert!(s.continue_to_play());
    assert!(s.select(0).accepted());
}

#[test]
fn six_pairs_in_ten_moves_with_42_seconds_left_scores_2898() {
    let mut s = session();
    s.load_layout(
        Level::One,
        Difficulty::Intermediate,
        &layout(&[17, 18, 19, 20, 21, 22]),
    )
    .unwrap();

    // Four mismatches, each settled after 2000ms: 8s elapsed, 4 moves.
    for (a, b) in [(0, 2), (4, 6), (8, 10), (1, 3)] {
        s.select(a);
        assert!(matches!(s.select(b), SelectResult::Mismatched { .. }));
        s.tick(2_000);
    }
    assert_eq!(s.moves_made(), 4);

    // Five matches, then let the clock reach 18s before the last one.
    for pair in 0..5 {
        s.select(pair * 2);
        s.select(pair * 2 + 1);
    }
    s.tick(10_000);
    assert_eq!(s.time_remaining(), 42);

    s.select(10);
    s.select(11);

    assert_eq!(s.phase(), Phase::Won);
    assert_eq!(s.moves_made(), 10);
    assert_eq!(s.score(), 2898);
    assert_eq!(s.best_score(), Some(2898));
}

#[test]
fn running_out_of_time_loses_with_zero_score() {
    let mut store = MemoryScoreStore::new();
    store.save_best(1500).unwrap();
    let mut s = GameSession::new(SessionConfig::default(), Box::new(store));
    s.load_layout(Level::One, Difficulty::Beginner, &layout(&[1, 2, 3, 4, 5, 6]))
        .unwrap();

    s.select(0);
    s.select(1);
    s.select(2);
    // 3749 frames = 59_984ms; the next frame reaches 60s.
    for _ in 0..3_749 {
        s.tick(16);
    }
    assert_eq!(s.time_remaining(), 1);
    assert_eq!(s.phase(), Phase::Playing);
    s.tick(16);

    assert_eq!(s.phase(), Phase::Lost);
    assert_eq!(s.score(), 0);
    assert_eq!(s.time_remaining(), 0);
    assert_eq!(s.best_score(), Some(1500));
    // The lone pick flips back, the earned pair stays.
    assert_eq!(state_of(&s, 2), TileState::Hidden);
    assert_eq!(state_of(&s, 0), TileState::Matched);
    assert_eq!(
        s.select(4),
        SelectResult::Rejected(RejectReason::NotPlaying)
    );

    let events = s.take_events();
    assert_eq!(events.last(), Some(&GameEvent::GameLost));
    assert!(events.contains(&GameEvent::TimerTick { remaining: 0 }));
}

#[test]
fn restart_invalidates_pending_settle() {
    let mut s = session();
    s.load_layout(Level::One, Difficulty::Beginner, &layout(&[1, 2, 3, 4, 5, 6]))
        .unwrap();
    s.select(0);
    s.select(2);

    let stale = s
        .pending_events()
        .iter()
        .find(|e| matches!(e.kind, ScheduledKind::MismatchSettle { .. }))
        .copied()
        .unwrap();

    s.restart().unwrap();
    assert_eq!(s.epoch(), stale.epoch + 1);
    assert!(s.pending_events().is_empty());
    assert_eq!(s.fire(stale), FireOutcome::Stale);

    let snap = s.snapshot();
    assert_eq!(snap.count_in(TileState::Hidden), 12);
    assert_eq!(snap.status.moves_made, 0);
    assert!(!snap.status.timer_running);
}

#[test]
fn generated_boards_are_reproducible_per_seed() {
    let config = || SessionConfig {
        seed: 99,
        ..SessionConfig::default()
    };
    let mut a = GameSession::new(config(), Box::new(MemoryScoreStore::new()));
    let mut b = GameSession::new(config(), Box::new(MemoryScoreStore::new()));
    for level in Level::ALL {
        a.load_level(level, Difficulty::Advanced).unwrap();
        b.load_level(level, Difficulty::Advanced).unwrap();
        assert_eq!(a.board(), b.board());
        assert_eq!(a.board().len(), level.tile_count());
        assert_eq!(a.board().pair_count(), level.matches_to_win());
    }
}

#[test]
fn every_generated_board_draws_from_its_difficulty() {
    let mut s = session();
    for difficulty in Difficulty::ALL {
        s.load_level(Level::Four, difficulty).unwrap();
        for tile in s.board().tiles() {
            let entry = s
                .pool()
                .entries()
                .iter()
                .find(|e| e.key == tile.key)
                .unwrap();
            assert_eq!(entry.difficulty, difficulty);
        }
    }
}

#[test]
fn won_game_is_frozen_until_restart() {
    let mut s = session();
    s.load_layout(Level::One, Difficulty::Beginner, &layout(&[1, 2, 3, 4, 5, 6]))
        .unwrap();
    for pair in 0..6 {
        s.select(pair * 2);
        s.select(pair * 2 + 1);
    }
    assert_eq!(s.phase(), Phase::Won);

    let won = s
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::GameWon { .. }))
        .count();
    assert_eq!(won, 1);

    let score = s.score();
    assert_eq!(
        s.select(0),
        SelectResult::Rejected(RejectReason::NotPlaying)
    );
    s.tick(200_000);
    assert!(s.take_events().is_empty());
    assert_eq!(s.phase(), Phase::Won);
    assert_eq!(s.score(), score);

    s.restart().unwrap();
    let snap = s.snapshot();
    assert_eq!(snap.status.phase, Phase::Playing);
    assert_eq!(snap.status.moves_made, 0);
    assert_eq!(snap.status.matches_found, 0);
    assert!(!snap.status.timer_running);
    assert_eq!(snap.count_in(TileState::Hidden), 12);
}
