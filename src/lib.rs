//! Orbital Capture - fill rotating electron slots in the right order
//!
//! Core modules:
//! - `sim`: Deterministic simulation (slots, particles, storms, progression)
//! - `catalog`: Level data (element configurations)
//! - `persistence`: Best-time record port and its stores
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod catalog;
pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use catalog::{Catalog, LevelDefinition, SlotDefinition};
pub use error::{EngineError, LevelError, PersistenceError, TuningError};
pub use sim::{Engine, EngineEvent, EngineSnapshot, TickInput};
pub use settings::{Difficulty, Settings, TimerMode};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (logical 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (pixels, origin top-left)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Visual ring radius of a slot; the capture band straddles it
    pub const SLOT_RING_RADIUS: f32 = 20.0;
    /// Radius the captured particle is drawn orbiting at
    pub const SLOT_ORBIT_RADIUS: f32 = 18.0;

    /// Particle body radius
    pub const PARTICLE_RADIUS: f32 = 8.0;

    /// Guard for divisions by a distance
    pub const MIN_DISTANCE: f32 = 1e-3;
}

/// Center of the arena
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
