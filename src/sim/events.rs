//! Discrete notifications produced by a tick
//!
//! The engine returns the events of each update in order. Audio, tutorial and
//! HUD layers react to them; nothing they do feeds back into the simulation.

use serde::{Deserialize, Serialize};

use super::gate::StunCause;
use super::rules::RuleViolation;

/// Something that happened during one update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Capture {
        slot: usize,
        particle: u32,
    },
    Stun {
        slot: usize,
        particle: u32,
        cause: StunCause,
        /// Set for wrong-order stuns
        violation: Option<RuleViolation>,
        duration: f32,
        escalation: u32,
    },
    /// First hit on an occupied slot (it shakes)
    Hit {
        slot: usize,
        particle: u32,
    },
    Knockout {
        slot: usize,
        /// The ejected particle
        particle: u32,
        /// The particle whose hit caused it
        hitter: u32,
    },
    WallBounce {
        particle: u32,
        speed: f32,
    },
    StormSpawned {
        storm: u32,
    },
    LevelStarted {
        level: usize,
    },
    LevelComplete {
        level: usize,
        score: u64,
        level_time: f32,
    },
    TimeWarning {
        remaining: f32,
    },
    Timeout {
        level: usize,
    },
    CycleAdvance {
        cycle: u32,
        time_limit: f32,
        pass_time: f32,
    },
    NewBestTime {
        seconds: f32,
        previous: Option<f32>,
    },
    Restarted,
}

/// Observer for engine events; every method defaults to doing nothing
#[allow(unused_variables)]
pub trait EngineListener {
    fn on_capture(&mut self, slot: usize, particle: u32) {}
    fn on_stun(&mut self, slot: usize, cause: StunCause, duration: f32) {}
    fn on_hit(&mut self, slot: usize) {}
    fn on_knockout(&mut self, slot: usize, particle: u32) {}
    fn on_wall_bounce(&mut self, speed: f32) {}
    fn on_storm_spawned(&mut self, storm: u32) {}
    fn on_level_started(&mut self, level: usize) {}
    fn on_level_complete(&mut self, level: usize, score: u64) {}
    fn on_time_warning(&mut self, remaining: f32) {}
    fn on_timeout(&mut self, level: usize) {}
    fn on_cycle_advance(&mut self, cycle: u32, time_limit: f32) {}
    fn on_new_best_time(&mut self, seconds: f32) {}
    fn on_restart(&mut self) {}
}

/// Fan a tick's events out to a listener, in order
pub fn dispatch_events(events: &[EngineEvent], listener: &mut dyn EngineListener) {
    for event in events {
        match *event {
            EngineEvent::Capture { slot, particle } => listener.on_capture(slot, particle),
            EngineEvent::Stun {
                slot,
                cause,
                duration,
                ..
            } => listener.on_stun(slot, cause, duration),
            EngineEvent::Hit { slot, .. } => listener.on_hit(slot),
            EngineEvent::Knockout { slot, particle, .. } => listener.on_knockout(slot, particle),
            EngineEvent::WallBounce { speed, .. } => listener.on_wall_bounce(speed),
            EngineEvent::StormSpawned { storm } => listener.on_storm_spawned(storm),
            EngineEvent::LevelStarted { level } => listener.on_level_started(level),
            EngineEvent::LevelComplete { level, score, .. } => {
                listener.on_level_complete(level, score)
            }
            EngineEvent::TimeWarning { remaining } => listener.on_time_warning(remaining),
            EngineEvent::Timeout { level } => listener.on_timeout(level),
            EngineEvent::CycleAdvance {
                cycle, time_limit, ..
            } => listener.on_cycle_advance(cycle, time_limit),
            EngineEvent::NewBestTime { seconds, .. } => listener.on_new_best_time(seconds),
            EngineEvent::Restarted => listener.on_restart(),
        }
    }
}
