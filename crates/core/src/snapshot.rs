use crate::types::{Difficulty, Level, PairKey, Phase, TileRole, TileState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSnapshot {
    pub index: usize,
    pub key: PairKey,
    pub role: TileRole,
    pub state: TileState,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionStatus {
    pub level: Level,
    pub difficulty: Difficulty,
    pub phase: Phase,
    pub epoch: u32,
    pub moves_made: u32,
    pub matches_found: usize,
    pub matches_to_win: usize,
    pub time_remaining: u32,
    pub timer_running: bool,
    pub continue_to_play: bool,
    pub score: u32,
    pub best_score: Option<u32>,
    pub selection: Vec<usize>,
}

impl SessionStatus {
    pub fn playable(&self) -> bool {
        self.phase == Phase::Playing && self.continue_to_play
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub status: SessionStatus,
    pub tiles: Vec<TileSnapshot>,
}

impl GameSnapshot {
    pub fn tile(&self, index: usize) -> Option<&TileSnapshot> {
        self.tiles.get(index)
    }

    pub fn count_in(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|t| t.state == state).count()
    }
}
