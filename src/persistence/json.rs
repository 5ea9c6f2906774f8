//! JSON file store: `<dir>/<username>.json`
//!
//! Writes go to a temp file first and are renamed over the record, so a
//! crash mid-save leaves the previous record intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PlayerProfile, ProfileError, ProfileStore, SavedProgress, validate_username};

#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, username: &str) -> Result<PathBuf, ProfileError> {
        validate_username(username)?;
        Ok(self.dir.join(format!("{username}.json")))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, username: &str) -> Result<Option<SavedProgress>, ProfileError> {
        let path = self.record_path(username)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let progress = serde_json::from_str(&json)?;
        log::info!("Loaded progress for {username} from {}", path.display());
        Ok(Some(progress))
    }

    fn save(&mut self, profile: &PlayerProfile) -> Result<(), ProfileError> {
        let path = self.record_path(&profile.username)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(&profile.progress())?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::info!(
            "Progress saved for {} (score {}, level {})",
            profile.username,
            profile.score,
            profile.level
        );
        Ok(())
    }
}
