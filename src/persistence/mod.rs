//! Best-time persistence
//!
//! The progression controller only ever talks to [`BestTimeStore`]. Stores
//! never fail outward: a missing or unreadable record is "no record", and write
//! failures are logged.
//!
//! Stores:
//! - [`MemoryStore`]: in-process, for tests and relaxed sessions
//! - [`JsonFileStore`]: versioned JSON envelope on disk (native)
//! - [`LocalStorageStore`]: browser LocalStorage (wasm32)

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Current record envelope version
pub const RECORD_VERSION: u32 = 1;

/// Port to the external key-value store holding the best full-pass time
pub trait BestTimeStore {
    /// Best full catalog pass in seconds, if one was ever recorded
    fn load_best_time(&self) -> Option<f32>;
    fn save_best_time(&mut self, seconds: f32);
}

/// Serialized form of the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTimeRecord {
    pub version: u32,
    pub best_time_secs: f32,
}

impl BestTimeRecord {
    pub fn new(best_time_secs: f32) -> Self {
        Self {
            version: RECORD_VERSION,
            best_time_secs,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and check the envelope version and value
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let record: BestTimeRecord = serde_json::from_str(json)?;
        if record.version != RECORD_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: record.version,
                expected: RECORD_VERSION,
            });
        }
        if !(record.best_time_secs.is_finite() && record.best_time_secs > 0.0) {
            return Err(PersistenceError::InvalidRecord(record.best_time_secs));
        }
        Ok(record)
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<f32>,
    /// Number of saves performed
    pub saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(seconds: f32) -> Self {
        Self {
            best: Some(seconds),
            saves: 0,
        }
    }
}

impl BestTimeStore for MemoryStore {
    fn load_best_time(&self) -> Option<f32> {
        self.best
    }

    fn save_best_time(&mut self, seconds: f32) {
        self.best = Some(seconds);
        self.saves += 1;
    }
}
