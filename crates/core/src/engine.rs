//! Selection & match engine
//!
//! Governs which tiles may be turned face up and judges each completed pair.
//! The engine knows nothing about phases or timers; the session checks that
//! the game is being played before delegating here and reacts to the result.
//!
//! ```text
//! Idle --select--> OneSelected --select--> Judging --match----> Idle
//!                                                  \--mismatch-> Idle (settle pending)
//! ```

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{RejectReason, SelectResult, TileState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Idle,
    OneSelected,
    /// Two tiles face up, pair being judged. Never observable between calls.
    Judging,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    selection: ArrayVec<usize, 2>,
    moves_made: u32,
    matches_found: usize,
    /// Mismatched pair waiting to flip back.
    pending_settle: Option<[usize; 2]>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EngineState {
        match self.selection.len() {
            0 => EngineState::Idle,
            1 => EngineState::OneSelected,
            _ => EngineState::Judging,
        }
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    pub fn matches_found(&self) -> usize {
        self.matches_found
    }

    pub fn pending_settle(&self) -> Option<[usize; 2]> {
        self.pending_settle
    }

    /// Whether a new selection could be accepted right now.
    pub fn continue_to_play(&self) -> bool {
        self.pending_settle.is_none() && self.selection.len() < 2
    }

    /// Turn tile `index` face up and, if it completes a pair, judge the pair.
    pub fn select(&mut self, board: &mut Board, index: usize) -> SelectResult {
        if self.pending_settle.is_some() {
            return SelectResult::Rejected(RejectReason::SettlePending);
        }
        let Some(tile) = board.get(index) else {
            return SelectResult::Rejected(RejectReason::OutOfRange);
        };
        match tile.state {
            TileState::Matched => return SelectResult::Rejected(RejectReason::AlreadyMatched),
            TileState::Selected => return SelectResult::Rejected(RejectReason::AlreadySelected),
            TileState::Hidden => {}
        }
        if self.selection.try_push(index).is_err() {
            return SelectResult::Rejected(RejectReason::SelectionFull);
        }
        board.set_state(index, TileState::Selected);

        match self.state() {
            EngineState::Judging => self.judge(board),
            _ => SelectResult::FirstSelected { index },
        }
    }

    fn judge(&mut self, board: &mut Board) -> SelectResult {
        let first = self.selection[0];
        let second = self.selection[1];
        self.selection.clear();
        self.moves_made += 1;

        let same_key = match (board.get(first), board.get(second)) {
            (Some(a), Some(b)) => a.key == b.key,
            _ => false,
        };

        if same_key {
            board.set_state(first, TileState::Matched);
            board.set_state(second, TileState::Matched);
            self.matches_found += 1;
            SelectResult::Matched { first, second }
        } else {
            self.pending_settle = Some([first, second]);
            SelectResult::Mismatched { first, second }
        }
    }

    /// Flip the pending mismatched pair back to hidden. Returns false if `pair`
    /// is not the pair currently waiting.
    pub fn settle(&mut self, board: &mut Board, pair: [usize; 2]) -> bool {
        if self.pending_settle != Some(pair) {
            return false;
        }
        self.pending_settle = None;
        for index in pair {
            board.set_state(index, TileState::Hidden);
        }
        true
    }

    /// Drop the pending settle without touching the tiles.
    pub fn cancel_settle(&mut self) -> Option<[usize; 2]> {
        self.pending_settle.take()
    }

    /// Hide a half-made selection (one tile face up). Used when the game ends.
    pub fn hide_lone_selection(&mut self, board: &mut Board) -> Option<usize> {
        if self.selection.len() != 1 {
            return None;
        }
        let index = self.selection[0];
        self.selection.clear();
        board.set_state(index, TileState::Hidden);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Tile;
    use crate::types::{PairKey, TileRole};

    fn board() -> Board {
        // keys: 0:A 1:B 2:A 3:C 4:B 5:C
        let keys = [1, 2, 1, 3, 2, 3];
        let roles = [
            TileRole::Image,
            TileRole::Image,
            TileRole::Label,
            TileRole::Image,
            TileRole::Label,
            TileRole::Label,
        ];
        Board::from_tiles(
            keys.iter()
                .zip(roles)
                .map(|(&k, r)| Tile::new(PairKey(k), r))
                .collect(),
            0,
        )
    }

    #[test]
    fn first_selection_turns_tile_up() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        assert_eq!(e.select(&mut b, 1), SelectResult::FirstSelected { index: 1 });
        assert_eq!(b.get(1).unwrap().state, TileState::Selected);
        assert_eq!(e.state(), EngineState::OneSelected);
        assert_eq!(e.moves_made(), 0);
    }

    #[test]
    fn matching_pair_is_resolved_synchronously() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        e.select(&mut b, 0);
        assert_eq!(
            e.select(&mut b, 2),
            SelectResult::Matched { first: 0, second: 2 }
        );
        assert!(b.get(0).unwrap().is_matched());
        assert!(b.get(2).unwrap().is_matched());
        assert_eq!(e.matches_found(), 1);
        assert_eq!(e.moves_made(), 1);
        assert_eq!(e.state(), EngineState::Idle);
        assert!(e.continue_to_play());
    }

    #[test]
    fn mismatch_blocks_until_settled() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        e.select(&mut b, 0);
        assert_eq!(
            e.select(&mut b, 1),
            SelectResult::Mismatched { first: 0, second: 1 }
        );
        assert_eq!(e.moves_made(), 1);
        assert_eq!(e.matches_found(), 0);
        assert!(!e.continue_to_play());
        assert_eq!(
            e.select(&mut b, 3),
            SelectResult::Rejected(RejectReason::SettlePending)
        );
        assert_eq!(b.get(3).unwrap().state, TileState::Hidden);

        assert!(!e.settle(&mut b, [1, 0]));
        assert!(e.settle(&mut b, [0, 1]));
        assert!(b.get(0).unwrap().is_hidden());
        assert!(b.get(1).unwrap().is_hidden());
        assert!(e.continue_to_play());
        assert!(!e.settle(&mut b, [0, 1]));
    }

    #[test]
    fn invalid_selections_are_ignored() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        assert_eq!(
            e.select(&mut b, 6),
            SelectResult::Rejected(RejectReason::OutOfRange)
        );
        e.select(&mut b, 3);
        assert_eq!(
            e.select(&mut b, 3),
            SelectResult::Rejected(RejectReason::AlreadySelected)
        );
        e.select(&mut b, 5);
        e.select(&mut b, 0);
        assert_eq!(
            e.select(&mut b, 5),
            SelectResult::Rejected(RejectReason::AlreadyMatched)
        );
        assert_eq!(e.moves_made(), 1);
        assert_eq!(e.selection(), &[0]);
    }

    #[test]
    fn lone_selection_can_be_hidden() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        assert_eq!(e.hide_lone_selection(&mut b), None);
        e.select(&mut b, 4);
        assert_eq!(e.hide_lone_selection(&mut b), Some(4));
        assert!(b.get(4).unwrap().is_hidden());
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn cancel_settle_leaves_tiles_face_up() {
        let mut b = board();
        let mut e = SelectionEngine::new();
        e.select(&mut b, 0);
        e.select(&mut b, 3);
        assert_eq!(e.cancel_settle(), Some([0, 3]));
        assert_eq!(b.get(0).unwrap().state, TileState::Selected);
        assert!(e.continue_to_play());
    }
}
