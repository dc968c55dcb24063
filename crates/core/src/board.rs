//! Board module - tile layout for one level attempt
//!
//! A board is an ordered sequence of tiles, two per drawn pair key. The order is
//! the layout order: presentation code places tile `i` at grid slot `i`, so the
//! shuffle happens here rather than in any layout code.

use std::fmt;

use crate::pool::PairPool;
use crate::rng::RandomSource;
use crate::types::{Difficulty, Level, PairKey, TileRole, TileState};

/// One face of a matchable pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub key: PairKey,
    pub role: TileRole,
    pub state: TileState,
}

impl Tile {
    pub fn new(key: PairKey, role: TileRole) -> Self {
        Self {
            key,
            role,
            state: TileState::Hidden,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.state == TileState::Hidden
    }

    pub fn is_matched(&self) -> bool {
        self.state == TileState::Matched
    }
}

/// Board generation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The difficulty's pool cannot supply enough distinct keys for the level.
    InsufficientPool {
        difficulty: Difficulty,
        available: usize,
        required: usize,
    },
    /// A fixed layout does not have the level's tile count.
    LayoutSize { expected: usize, actual: usize },
    /// A fixed layout carries a key other than once per role.
    Unpaired { key: PairKey },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InsufficientPool {
                difficulty,
                available,
                required,
            } => write!(
                f,
                "pair pool for {} has {} keys, level needs {}",
                difficulty.as_str(),
                available,
                required
            ),
            BoardError::LayoutSize { expected, actual } => {
                write!(f, "layout has {} tiles, level needs {}", actual, expected)
            }
            BoardError::Unpaired { key } => {
                write!(f, "key {} does not appear once as image and once as label", key)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// Ordered tiles for one level attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tiles: Vec<Tile>,
    /// Session epoch the board was generated under.
    epoch: u32,
}

impl Board {
    pub(crate) fn from_tiles(tiles: Vec<Tile>, epoch: u32) -> Self {
        Self { tiles, epoch }
    }

    /// Build a board from a fixed layout (replays, scripted hosts, tests).
    ///
    /// The layout must have the level's tile count and carry every key exactly
    /// twice, once per role. Tiles start hidden regardless of their input state.
    pub fn from_layout(
        level: Level,
        layout: &[(PairKey, TileRole)],
        epoch: u32,
    ) -> Result<Self, BoardError> {
        if layout.len() != level.tile_count() {
            return Err(BoardError::LayoutSize {
                expected: level.tile_count(),
                actual: layout.len(),
            });
        }
        for &(key, role) in layout {
            let same_role = layout.iter().filter(|&&(k, r)| k == key && r == role).count();
            let total = layout.iter().filter(|&&(k, _)| k == key).count();
            if same_role != 1 || total != 2 {
                return Err(BoardError::Unpaired { key });
            }
        }
        let tiles = layout.iter().map(|&(key, role)| Tile::new(key, role)).collect();
        Ok(Self { tiles, epoch })
    }

    /// Draw `level.matches_to_win()` distinct keys for `difficulty` and lay out a
    /// shuffled board with an image and a label tile per key.
    ///
    /// The pool size is checked before anything is drawn; on failure no board
    /// exists and the caller's state is untouched.
    pub fn generate(
        level: Level,
        difficulty: Difficulty,
        pool: &PairPool,
        rng: &mut impl RandomSource,
        epoch: u32,
    ) -> Result<Self, BoardError> {
        let required = level.matches_to_win();
        let mut candidates = pool.keys_for(difficulty);
        if candidates.len() < required {
            return Err(BoardError::InsufficientPool {
                difficulty,
                available: candidates.len(),
                required,
            });
        }

        // Partial Fisher-Yates: the first `required` slots become a uniform draw
        // without replacement.
        for i in 0..required {
            let remaining = (candidates.len() - i) as u32;
            let j = i + rng.next_range(remaining) as usize;
            candidates.swap(i, j);
        }

        let mut tiles = Vec::with_capacity(required * 2);
        for &key in &candidates[..required] {
            tiles.push(Tile::new(key, TileRole::Image));
            tiles.push(Tile::new(key, TileRole::Label));
        }
        rng.shuffle(&mut tiles);

        Ok(Self { tiles, epoch })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub(crate) fn set_state(&mut self, index: usize, state: TileState) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.state = state;
        }
    }

    pub fn pair_count(&self) -> usize {
        self.tiles.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_matched()).count() / 2
    }

    /// Indices of tiles currently in `state`.
    pub fn indices_in(&self, state: TileState) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.state == state)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the other tile carrying the same key, if any.
    pub fn partner_of(&self, index: usize) -> Option<usize> {
        let key = self.tiles.get(index)?.key;
        self.tiles
            .iter()
            .enumerate()
            .find(|(i, t)| *i != index && t.key == key)
            .map(|(i, _)| i)
    }
}
