//! Player preferences
//!
//! Persisted separately from the best-time record; the host decides where.

use serde::{Deserialize, Serialize};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to the base time budget
    pub fn time_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.75,
        }
    }
}

/// Whether the per-level time budget is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimerMode {
    #[default]
    Timed,
    /// No timeouts; the clocks still run for best-time tracking
    Relaxed,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub timer: TimerMode,
    /// Storms appear from the second catalog pass onward
    pub hazards: bool,
    /// Advance automatically once the completion delay elapses
    pub auto_advance: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            timer: TimerMode::Timed,
            hazards: true,
            auto_advance: true,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Relaxed play: no timer, no storms
    pub fn relaxed() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            timer: TimerMode::Relaxed,
            hazards: false,
            auto_advance: true,
        }
    }

    pub fn timer_enabled(&self) -> bool {
        self.timer == TimerMode::Timed
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
