//! Error types
//!
//! Level data is validated once, when a [`crate::Catalog`] is built; the engine
//! never runs on a half-valid catalog. Persistence errors stay inside the store
//! implementations and are logged there.

use thiserror::Error;

/// Malformed level data
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("catalog must contain at least one level")]
    EmptyCatalog,
    #[error("level {level} has no slots")]
    EmptyLevel { level: usize },
    #[error("level {level} shell at radius {shell_radius} has no primary slots")]
    MissingPrimaryGroup { level: usize, shell_radius: f32 },
    #[error("level {level} slot {slot} is invalid: {reason}")]
    InvalidSlot {
        level: usize,
        slot: usize,
        reason: &'static str,
    },
    #[error("catalog JSON could not be parsed: {0}")]
    Parse(String),
}

/// Malformed or inconsistent tuning values
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("tuning value `{name}` must be {expected}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
    },
    #[error("tuning JSON could not be parsed: {0}")]
    Parse(String),
}

/// Engine construction failures
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Best-time store failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("record I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported record version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("record holds an invalid best time: {0}")]
    InvalidRecord(f32),
    #[error("storage backend unavailable")]
    Unavailable,
}
