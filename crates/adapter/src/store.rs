//! File-backed best-score persistence.
//!
//! Stores `{"highest_score": N}` as JSON. A missing or unreadable file reads
//! as "no best score yet".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::ScoreStore;

pub const DEFAULT_SCORE_PATH: &str = "tile-memory-score.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ScoreFile {
    highest_score: u32,
}

/// Best score kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `TILE_MEMORY_SCORE_PATH`, or the working-directory default.
    pub fn from_env() -> Self {
        let path = std::env::var("TILE_MEMORY_SCORE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCORE_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonScoreStore {
    fn load_best(&self) -> Option<u32> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice::<ScoreFile>(&bytes)
            .ok()
            .map(|f| f.highest_score)
    }

    fn save_best(&mut self, score: u32) -> io::Result<()> {
        let body = serde_json::to_vec(&ScoreFile {
            highest_score: score,
        })?;

        // Write-then-rename.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)
    }
}
