//! Persisted best score per game.
//!
//! Scores live in a flat JSON object (`{"jumper": 120, ...}`) that is read
//! once when the store is opened and rewritten synchronously whenever a game
//! sets a new best. A missing or unreadable file simply means no scores yet;
//! write failures are logged and the in-memory value is kept.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bevy_ecs::prelude::Resource;
use log::{debug, error, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to access high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed high score file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct HighScoreStore {
    path: Option<PathBuf>,
    scores: BTreeMap<String, u32>,
}

impl HighScoreStore {
    /// Open the store backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scores = match read_scores(&path) {
            Ok(scores) => {
                info!("Loaded {} high score(s) from {:?}", scores.len(), path);
                scores
            }
            Err(HighScoreError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!("No high score file at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => {
                warn!("{}; starting with no scores", e);
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            scores,
        }
    }

    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Best score for `game`, 0 when none was recorded.
    pub fn get(&self, game: &str) -> u32 {
        self.scores.get(game).copied().unwrap_or(0)
    }

    /// Would `score` beat the stored best?
    pub fn is_new_high_score(&self, game: &str, score: u32) -> bool {
        score > self.get(game)
    }

    /// Record `score` if it strictly beats the stored best.
    ///
    /// Returns true only on improvement; the file is rewritten only then.
    pub fn update(&mut self, game: &str, score: u32) -> bool {
        if !self.is_new_high_score(game, score) {
            return false;
        }
        let previous = self.get(game);
        self.scores.insert(game.to_string(), score);
        info!(
            "New high score for '{}': {} (previous {})",
            game, score, previous
        );
        self.persist();
        true
    }

    pub fn all_scores(&self) -> &BTreeMap<String, u32> {
        &self.scores
    }

    /// Forget the score of one game.
    pub fn reset(&mut self, game: &str) {
        if self.scores.remove(game).is_some() {
            info!("High score reset for '{}'", game);
            self.persist();
        }
    }

    pub fn reset_all(&mut self) {
        self.scores.clear();
        info!("All high scores reset");
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_scores(path, &self.scores) {
            error!("{}", e);
        }
    }
}

fn read_scores(path: &Path) -> Result<BTreeMap<String, u32>, HighScoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| HighScoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HighScoreError::Format {
        path: path.to_path_buf(),
        source,
    })
}

fn write_scores(path: &Path, scores: &BTreeMap<String, u32>) -> Result<(), HighScoreError> {
    let io_err = |source| HighScoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = serde_json::to_string_pretty(scores).map_err(|source| HighScoreError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_game_scores_zero() {
        let store = HighScoreStore::in_memory();
        assert_eq!(store.get("jumper"), 0);
        assert!(store.all_scores().is_empty());
    }

    #[test]
    fn test_update_is_strict() {
        let mut store = HighScoreStore::in_memory();
        assert!(store.update("jumper", 80));
        assert!(!store.update("jumper", 80));
        assert!(!store.update("jumper", 79));
        assert!(store.update("jumper", 120));
        assert_eq!(store.get("jumper"), 120);
    }

    #[test]
    fn test_zero_score_is_not_a_record() {
        let mut store = HighScoreStore::in_memory();
        assert!(!store.update("jumper", 0));
        assert!(store.all_scores().is_empty());
    }

    #[test]
    fn test_scores_persist_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores").join("high_scores.json");

        let mut store = HighScoreStore::open(&path);
        assert!(store.update("jumper", 120));
        assert!(store.update("sky", 5));

        let reopened = HighScoreStore::open(&path);
        assert_eq!(reopened.get("jumper"), 120);
        assert_eq!(reopened.get("sky"), 5);
    }

    #[test]
    fn test_no_improvement_does_not_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("high_scores.json");
        let mut store = HighScoreStore::open(&path);
        store.update("jumper", 120);

        // Replace the file behind the store's back: a non-improving update
        // must leave it untouched.
        std::fs::write(&path, "{\"marker\": 1}").unwrap();
        assert!(!store.update("jumper", 100));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"marker\": 1}");
    }

    #[test]
    fn test_corrupt_file_means_no_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("high_scores.json");
        std::fs::write(&path, "not json").unwrap();

        let mut store = HighScoreStore::open(&path);
        assert_eq!(store.get("jumper"), 0);
        assert!(store.update("jumper", 1));
        assert_eq!(HighScoreStore::open(&path).get("jumper"), 1);
    }

    #[test]
    fn test_reset() {
        let mut store = HighScoreStore::in_memory();
        store.update("a", 10);
        store.update("b", 20);
        store.reset("a");
        assert_eq!(store.get("a"), 0);
        assert_eq!(store.get("b"), 20);
        store.reset_all();
        assert!(store.all_scores().is_empty());
    }

    #[test]
    fn test_is_new_high_score_is_pure() {
        let mut store = HighScoreStore::in_memory();
        store.update("a", 10);
        assert!(store.is_new_high_score("a", 11));
        assert!(!store.is_new_high_score("a", 10));
        assert_eq!(store.get("a"), 10);
    }
}
