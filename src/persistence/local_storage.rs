//! Browser LocalStorage store (wasm32)

use super::{BestTimeRecord, BestTimeStore};
use crate::error::PersistenceError;

/// Keeps the record under one LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::STORAGE_KEY)
    }
}

impl LocalStorageStore {
    /// Default LocalStorage key
    pub const STORAGE_KEY: &'static str = "orbital_capture_best_time";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PersistenceError::Unavailable)
    }

    fn read(&self) -> Result<Option<BestTimeRecord>, PersistenceError> {
        let storage = Self::storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(json)) => Ok(Some(BestTimeRecord::from_json(&json)?)),
            Ok(None) => Ok(None),
            Err(_) => Err(PersistenceError::Unavailable),
        }
    }

    fn write(&self, seconds: f32) -> Result<(), PersistenceError> {
        let json = BestTimeRecord::new(seconds).to_json()?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|_| PersistenceError::Unavailable)
    }
}

impl BestTimeStore for LocalStorageStore {
    fn load_best_time(&self) -> Option<f32> {
        match self.read() {
            Ok(record) => record.map(|r| r.best_time_secs),
            Err(e) => {
                log::warn!("No usable best time in LocalStorage: {}", e);
                None
            }
        }
    }

    fn save_best_time(&mut self, seconds: f32) {
        match self.write(seconds) {
            Ok(()) => log::info!("Best time saved ({:.2}s)", seconds),
            Err(e) => log::warn!("Could not save best time: {}", e),
        }
    }
}
