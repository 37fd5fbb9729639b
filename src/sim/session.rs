//! Session and level progression
//!
//! Tracks where the run is in the catalog, how many times it has wrapped
//! (cycles), the per-level time budget, score, and the best full-pass time. The
//! best time goes through the injected [`BestTimeStore`]; nothing here touches
//! global state.

use serde::{Deserialize, Serialize};

use crate::persistence::BestTimeStore;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Time budget for a cycle: shrinks linearly, never below `floor`
pub fn time_limit_for(cycle: u32, base: f32, decay: f32, floor: f32) -> f32 {
    (base - cycle as f32 * decay).max(floor)
}

/// Where the current level stands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    /// All slots filled; waiting for the advance
    LevelComplete { advance_in: f32 },
}

/// Run-wide progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub level_index: usize,
    /// Completed wraps of the catalog
    pub cycle_count: u32,
    /// Clock for the current attempt at this level
    pub level_elapsed: f32,
    /// Clock for the current full catalog pass
    pub pass_elapsed: f32,
    pub time_limit: f32,
    /// Mirror of the persisted record
    pub best_time: Option<f32>,
    pub score: u64,
    pub levels_completed: u32,
    pub phase: SessionPhase,
    pub time_warning_sent: bool,
}

impl SessionState {
    /// Seconds left on the clock (never negative)
    pub fn time_remaining(&self) -> f32 {
        (self.time_limit - self.level_elapsed).max(0.0)
    }
}

/// What the clock did this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockOutcome {
    Running,
    Warning { remaining: f32 },
    Timeout,
}

/// Summary of a catalog wrap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub cycle: u32,
    pub time_limit: f32,
    pub pass_time: f32,
    /// `(new, previous)` when the pass set a record
    pub new_best: Option<(f32, Option<f32>)>,
}

/// Result of moving to the next level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub level_index: usize,
    pub wrapped: Option<CycleSummary>,
}

/// Progression controller: owns the session and the best-time port
pub struct Progression {
    state: SessionState,
    store: Box<dyn BestTimeStore>,
    level_count: usize,
}

impl std::fmt::Debug for Progression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progression")
            .field("state", &self.state)
            .field("level_count", &self.level_count)
            .finish_non_exhaustive()
    }
}

impl Progression {
    pub fn new(
        store: Box<dyn BestTimeStore>,
        level_count: usize,
        tuning: &Tuning,
        settings: &Settings,
    ) -> Self {
        let best_time = store.load_best_time();
        match best_time {
            Some(best) => log::info!("Best pass time on record: {:.2}s", best),
            None => log::info!("No best pass time on record"),
        }
        Self {
            state: SessionState {
                level_index: 0,
                cycle_count: 0,
                level_elapsed: 0.0,
                pass_elapsed: 0.0,
                time_limit: Self::limit(0, tuning, settings),
                best_time,
                score: 0,
                levels_completed: 0,
                phase: SessionPhase::Playing,
                time_warning_sent: false,
            },
            store,
            level_count: level_count.max(1),
        }
    }

    fn limit(cycle: u32, tuning: &Tuning, settings: &Settings) -> f32 {
        time_limit_for(
            cycle,
            tuning.time_limit_base * settings.difficulty.time_scale(),
            tuning.time_limit_decay,
            tuning.time_limit_floor,
        )
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Catalog index, clamped to the catalog
    pub fn level_index(&self) -> usize {
        self.state.level_index.min(self.level_count - 1)
    }

    pub fn playing(&self) -> bool {
        self.state.phase == SessionPhase::Playing
    }

    /// Run the clocks for one tick of play
    pub fn tick_clock(&mut self, dt: f32, tuning: &Tuning, settings: &Settings) -> ClockOutcome {
        if !self.playing() {
            return ClockOutcome::Running;
        }
        self.state.level_elapsed += dt;
        self.state.pass_elapsed += dt;

        if !settings.timer_enabled() {
            return ClockOutcome::Running;
        }
        if self.state.level_elapsed >= self.state.time_limit {
            return ClockOutcome::Timeout;
        }
        let remaining = self.state.time_remaining();
        if !self.state.time_warning_sent && remaining <= tuning.time_warning_at {
            self.state.time_warning_sent = true;
            return ClockOutcome::Warning { remaining };
        }
        ClockOutcome::Running
    }

    /// The level restarts in place after running out of time
    pub fn on_timeout(&mut self) {
        log::info!(
            "Time's up on level {} (cycle {})",
            self.state.level_index,
            self.state.cycle_count
        );
        self.reset_clock();
    }

    /// Fresh attempt at the current level: full budget, warning re-armed
    pub fn reset_clock(&mut self) {
        self.state.level_elapsed = 0.0;
        self.state.time_warning_sent = false;
    }

    /// Record a completed level and start the advance countdown
    ///
    /// Returns the level's elapsed time. Does nothing unless playing.
    pub fn complete_level(&mut self, tuning: &Tuning) -> Option<f32> {
        if !self.playing() {
            return None;
        }
        self.state.score += (self.state.level_index as u64 + 1) * tuning.score_per_level;
        self.state.levels_completed += 1;
        self.state.phase = SessionPhase::LevelComplete {
            advance_in: tuning.advance_delay,
        };
        log::info!(
            "Level {} complete in {:.2}s, score {}",
            self.state.level_index,
            self.state.level_elapsed,
            self.state.score
        );
        Some(self.state.level_elapsed)
    }

    /// Count down the completion delay; true once the level should advance
    pub fn advance_due(&mut self, dt: f32, acknowledged: bool, auto_advance: bool) -> bool {
        let SessionPhase::LevelComplete { advance_in } = &mut self.state.phase else {
            return false;
        };
        *advance_in = (*advance_in - dt).max(0.0);
        acknowledged || (auto_advance && *advance_in <= 0.0)
    }

    /// Move to the next level, wrapping the catalog into a new cycle
    pub fn advance(&mut self, tuning: &Tuning, settings: &Settings) -> Advance {
        let state = &mut self.state;
        state.phase = SessionPhase::Playing;
        state.level_elapsed = 0.0;
        state.time_warning_sent = false;
        state.level_index += 1;

        if state.level_index < self.level_count {
            return Advance {
                level_index: state.level_index,
                wrapped: None,
            };
        }

        state.level_index = 0;
        state.cycle_count += 1;
        state.time_limit = Self::limit(state.cycle_count, tuning, settings);
        let pass_time = state.pass_elapsed;
        state.pass_elapsed = 0.0;

        let previous = self.store.load_best_time();
        let new_best = match previous {
            Some(best) if pass_time >= best => None,
            _ => {
                self.store.save_best_time(pass_time);
                log::info!("New best pass time: {:.2}s", pass_time);
                Some((pass_time, previous))
            }
        };
        self.state.best_time = match new_best {
            Some((best, _)) => Some(best),
            None => previous,
        };

        log::info!(
            "Cycle {} begins, time limit {:.1}s",
            self.state.cycle_count,
            self.state.time_limit
        );
        Advance {
            level_index: 0,
            wrapped: Some(CycleSummary {
                cycle: self.state.cycle_count,
                time_limit: self.state.time_limit,
                pass_time,
                new_best,
            }),
        }
    }

    /// Back to the first level of the first cycle; the record is kept
    pub fn restart(&mut self, tuning: &Tuning, settings: &Settings) {
        let best_time = self.store.load_best_time();
        self.state = SessionState {
            level_index: 0,
            cycle_count: 0,
            level_elapsed: 0.0,
            pass_elapsed: 0.0,
            time_limit: Self::limit(0, tuning, settings),
            best_time,
            score: 0,
            levels_completed: 0,
            phase: SessionPhase::Playing,
            time_warning_sent: false,
        };
        log::info!("Session restarted");
    }
}
