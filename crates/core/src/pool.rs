//! Pair pool - the catalogue of concepts boards are drawn from
//!
//! Every entry is one concept (an animal in the built-in pool) tagged with the
//! difficulty tier it belongs to. A board for a given difficulty only ever draws
//! from entries carrying that tag.

use crate::types::{Difficulty, PairKey};

/// One drawable concept: an image face and a label face share its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    pub key: PairKey,
    pub name: String,
    pub difficulty: Difficulty,
}

const BEGINNER: [&str; 16] = [
    "cat", "dog", "cow", "pig", "horse", "sheep", "duck", "chicken", "rabbit", "mouse",
    "fish", "bird", "frog", "bear", "lion", "goat",
];

const INTERMEDIATE: [&str; 16] = [
    "giraffe", "zebra", "monkey", "elephant", "tiger", "kangaroo", "penguin", "dolphin",
    "squirrel", "turtle", "camel", "owl", "fox", "wolf", "deer", "snake",
];

const ADVANCED: [&str; 16] = [
    "hedgehog", "hippopotamus", "rhinoceros", "crocodile", "chameleon", "flamingo",
    "porcupine", "octopus", "jellyfish", "armadillo", "platypus", "salamander",
    "woodpecker", "raccoon", "walrus", "peacock",
];

/// Catalogue of pair keys grouped by difficulty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPool {
    entries: Vec<PairEntry>,
}

impl PairPool {
    pub fn new(entries: Vec<PairEntry>) -> Self {
        Self { entries }
    }

    /// Built-in animal pool: 16 concepts per difficulty, enough for the largest level.
    pub fn builtin() -> Self {
        let tiers: [(Difficulty, &[&str]); 3] = [
            (Difficulty::Beginner, &BEGINNER),
            (Difficulty::Intermediate, &INTERMEDIATE),
            (Difficulty::Advanced, &ADVANCED),
        ];

        let mut entries = Vec::with_capacity(48);
        let mut next_key = 1u32;
        for (difficulty, names) in tiers {
            for name in names {
                entries.push(PairEntry {
                    key: PairKey(next_key),
                    name: (*name).to_string(),
                    difficulty,
                });
                next_key += 1;
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[PairEntry] {
        &self.entries
    }

    /// Keys tagged with `difficulty`, in catalogue order.
    pub fn keys_for(&self, difficulty: Difficulty) -> Vec<PairKey> {
        self.entries
            .iter()
            .filter(|e| e.difficulty == difficulty)
            .map(|e| e.key)
            .collect()
    }

    pub fn available(&self, difficulty: Difficulty) -> usize {
        self.entries
            .iter()
            .filter(|e| e.difficulty == difficulty)
            .count()
    }

    pub fn name_of(&self, key: PairKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.name.as_str())
    }
}

impl Default for PairPool {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;
    use std::collections::HashSet;

    #[test]
    fn builtin_pool_supports_every_level() {
        let pool = PairPool::builtin();
        let largest = Level::Four.matches_to_win();
        for d in Difficulty::ALL {
            assert!(pool.available(d) >= largest, "{:?} pool too small", d);
        }
    }

    #[test]
    fn builtin_keys_are_unique() {
        let pool = PairPool::builtin();
        let keys: HashSet<PairKey> = pool.entries().iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), pool.entries().len());
    }

    #[test]
    fn keys_for_filters_by_difficulty() {
        let pool = PairPool::builtin();
        let keys = pool.keys_for(Difficulty::Advanced);
        assert_eq!(keys.len(), 16);
        assert_eq!(pool.name_of(keys[0]), Some("hedgehog"));
        assert!(pool.name_of(PairKey(10_000)).is_none());
    }
}
