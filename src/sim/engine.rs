//! Engine facade
//!
//! Owns the level catalog, tuning, player settings, the current level, the storm
//! field, progression and the random source. Hosts drive it with
//! [`Engine::update`] and read it back with [`Engine::query_state`].

use rand_pcg::Pcg32;
use serde::Serialize;

use super::events::EngineEvent;
use super::hazard::{Storm, StormField};
use super::particle::Particle;
use super::rng::{RandomSource, seeded};
use super::session::{Progression, SessionState};
use super::slot::Slot;
use super::state::LevelState;
use super::tick::{TickInput, tick};
use crate::catalog::{Catalog, LevelDefinition};
use crate::error::EngineError;
use crate::persistence::BestTimeStore;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// The capture simulation
#[derive(Debug)]
pub struct Engine<R: RandomSource = Pcg32> {
    pub(crate) catalog: Catalog,
    pub(crate) tuning: Tuning,
    pub(crate) settings: Settings,
    pub(crate) level: LevelState,
    pub(crate) storms: StormField,
    pub(crate) progression: Progression,
    pub(crate) rng: R,
    /// Ticks simulated since construction
    pub(crate) time_ticks: u64,
}

/// Read-only view of the engine after an update
#[derive(Debug, Serialize)]
pub struct EngineSnapshot<'a> {
    pub level_index: usize,
    pub level: &'a LevelDefinition,
    pub slots: &'a [Slot],
    pub particles: &'a [Particle],
    pub storms: &'a [Storm],
    pub session: &'a SessionState,
    /// None when the timer is off
    pub time_remaining: Option<f32>,
    pub time_ticks: u64,
}

impl Engine<Pcg32> {
    /// Engine with the default PCG generator
    pub fn with_seed(
        catalog: Catalog,
        tuning: Tuning,
        settings: Settings,
        store: Box<dyn BestTimeStore>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::new(catalog, tuning, settings, store, seeded(seed))
    }
}

impl<R: RandomSource> Engine<R> {
    pub fn new(
        catalog: Catalog,
        tuning: Tuning,
        settings: Settings,
        store: Box<dyn BestTimeStore>,
        mut rng: R,
    ) -> Result<Self, EngineError> {
        tuning.validate()?;
        let progression = Progression::new(store, catalog.len(), &tuning, &settings);
        let level = LevelState::load(catalog.level(0), &tuning, &mut rng);
        log::info!(
            "Engine started: {} levels, {:?} difficulty, timer {}",
            catalog.len(),
            settings.difficulty,
            if settings.timer_enabled() { "on" } else { "off" }
        );
        Ok(Self {
            catalog,
            tuning,
            settings,
            level,
            storms: StormField::new(),
            progression,
            rng,
            time_ticks: 0,
        })
    }

    /// Advance one step of `dt` seconds
    pub fn update(&mut self, dt: f32, input: &TickInput) -> Vec<EngineEvent> {
        tick(self, input, dt)
    }

    pub fn query_state(&self) -> EngineSnapshot<'_> {
        let session = self.progression.state();
        EngineSnapshot {
            level_index: self.progression.level_index(),
            level: self.current_level(),
            slots: &self.level.slots,
            particles: &self.level.particles,
            storms: &self.storms.storms,
            session,
            time_remaining: self
                .settings
                .timer_enabled()
                .then(|| session.time_remaining()),
            time_ticks: self.time_ticks,
        }
    }

    /// Definition of the level being played
    pub fn current_level(&self) -> &LevelDefinition {
        self.catalog.level(self.progression.level_index())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start the whole run over from the first level
    pub fn restart(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        self.restart_run(&mut events);
        events
    }

    /// Start the current level over: fresh layout, no storms, full time budget
    pub fn reset_level(&mut self) {
        self.progression.reset_clock();
        self.storms.clear();
        self.reload_level();
    }

    pub(crate) fn reload_level(&mut self) {
        let index = self.progression.level_index();
        self.level = LevelState::load(self.catalog.level(index), &self.tuning, &mut self.rng);
    }

    pub(crate) fn restart_run(&mut self, events: &mut Vec<EngineEvent>) {
        self.progression.restart(&self.tuning, &self.settings);
        self.storms.clear();
        self.reload_level();
        events.push(EngineEvent::Restarted);
        events.push(EngineEvent::LevelStarted { level: 0 });
    }
}
