//! JSON file store (native)

use std::fs;
use std::path::{Path, PathBuf};

use super::{BestTimeRecord, BestTimeStore};
use crate::error::PersistenceError;

/// Keeps the record in a single JSON file, written via a temp file and rename
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<BestTimeRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(Some(BestTimeRecord::from_json(&json)?))
    }

    fn write(&self, seconds: f32) -> Result<(), PersistenceError> {
        let json = BestTimeRecord::new(seconds).to_json()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BestTimeStore for JsonFileStore {
    fn load_best_time(&self) -> Option<f32> {
        match self.read() {
            Ok(record) => record.map(|r| r.best_time_secs),
            Err(e) => {
                log::warn!("Ignoring unreadable best time at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save_best_time(&mut self, seconds: f32) {
        match self.write(seconds) {
            Ok(()) => log::info!("Best time saved ({:.2}s)", seconds),
            Err(e) => log::warn!("Could not save best time to {}: {}", self.path.display(), e),
        }
    }
}
