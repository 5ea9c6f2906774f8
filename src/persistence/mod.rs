//! Per-user progress persistence
//!
//! One record per username holding `{score, level}`. A missing record means
//! a fresh player: score 0, level 1.

mod json;

pub use json::JsonProfileStore;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving progress
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Username cannot be used as a storage key.
    #[error("invalid username {0:?}")]
    InvalidUsername(String),

    /// Underlying storage could not be read or written.
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record is not valid progress JSON.
    #[error("corrupt progress record: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted part of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub score: u32,
    pub level: u32,
}

impl Default for SavedProgress {
    fn default() -> Self {
        Self { score: 0, level: 1 }
    }
}

/// A player and their progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub username: String,
    pub score: u32,
    /// Always >= 1
    pub level: u32,
}

impl PlayerProfile {
    /// Fresh profile with default progress
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_progress(username, SavedProgress::default())
    }

    pub fn with_progress(username: impl Into<String>, progress: SavedProgress) -> Self {
        Self {
            username: username.into(),
            score: progress.score,
            level: progress.level.max(1),
        }
    }

    pub fn progress(&self) -> SavedProgress {
        SavedProgress {
            score: self.score,
            level: self.level,
        }
    }
}

/// Usernames double as storage keys, so they must be plain names
pub fn validate_username(username: &str) -> Result<(), ProfileError> {
    let bad = username.is_empty()
        || username.contains(['/', '\\', '\0'])
        || username == "."
        || username.contains("..");
    if bad {
        Err(ProfileError::InvalidUsername(username.to_string()))
    } else {
        Ok(())
    }
}

/// Key-value store of progress keyed by username
pub trait ProfileStore {
    /// Stored progress, `None` if the user never saved
    fn load(&self, username: &str) -> Result<Option<SavedProgress>, ProfileError>;

    fn save(&mut self, profile: &PlayerProfile) -> Result<(), ProfileError>;

    /// Stored progress as a profile, defaulting when absent
    fn load_profile(&self, username: &str) -> Result<PlayerProfile, ProfileError> {
        let progress = self.load(username)?.unwrap_or_default();
        Ok(PlayerProfile::with_progress(username, progress))
    }
}

impl<S: ProfileStore + ?Sized> ProfileStore for &mut S {
    fn load(&self, username: &str) -> Result<Option<SavedProgress>, ProfileError> {
        (**self).load(username)
    }

    fn save(&mut self, profile: &PlayerProfile) -> Result<(), ProfileError> {
        (**self).save(profile)
    }
}

/// In-process store, counts saves
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: HashMap<String, SavedProgress>,
    saves: usize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, username: &str) -> Result<Option<SavedProgress>, ProfileError> {
        validate_username(username)?;
        Ok(self.records.get(username).copied())
    }

    fn save(&mut self, profile: &PlayerProfile) -> Result<(), ProfileError> {
        validate_username(&profile.username)?;
        self.records.insert(profile.username.clone(), profile.progress());
        self.saves += 1;
        Ok(())
    }
}
