//! Score Persistence
//!
//! The engine owns no durable storage. It reads the best score when a
//! controller is created and reports new records through [`ScoreStore`].

pub mod settings;

use thiserror::Error;

pub use settings::{JsonSettingsStore, Settings};

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Settings file could not be read or written.
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contents are not valid.
    #[error("settings (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Where the best score lives between sessions.
pub trait ScoreStore: Send {
    /// Best score recorded so far.
    fn high_score(&self) -> u32;

    /// Record a score. Implementations keep the maximum.
    fn record_high_score(&mut self, score: u32) -> Result<(), StoreError>;
}

/// Volatile store, for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    high_score: u32,
}

impl MemoryStore {
    /// Store seeded with an existing best score.
    pub fn with_high_score(high_score: u32) -> Self {
        Self { high_score }
    }
}

impl ScoreStore for MemoryStore {
    fn high_score(&self) -> u32 {
        self.high_score
    }

    fn record_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.high_score = self.high_score.max(score);
        Ok(())
    }
}
