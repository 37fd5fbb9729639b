//! Data-driven game balance
//!
//! Every gameplay constant lives here. Units are pixels and seconds: velocities
//! in px/s, accelerations in px/s², angles in radians. `#[serde(default)]` lets a
//! JSON override name only the values it changes.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::ParticleKind;

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Particle motion ===
    /// Pointer influence radius
    pub pointer_radius: f32,
    /// Peak pointer acceleration (at zero distance, falls off linearly)
    pub pointer_accel: f32,
    /// Slot attraction/repulsion radius
    pub slot_pull_radius: f32,
    /// Peak slot attraction for a matching particle
    pub slot_pull_accel: f32,
    /// Repulsion from a slot of the other kind, relative to `slot_pull_accel`
    pub wrong_kind_push_factor: f32,
    /// Velocity multiplier per 60 Hz tick
    pub damping_per_tick: f32,
    /// Speed kept after reflecting off an arena wall
    pub wall_restitution: f32,
    /// Wall hits slower than this are not reported
    pub wall_bounce_min_speed: f32,

    // === Capture ===
    pub capture_inner_primary: f32,
    pub capture_outer_primary: f32,
    pub capture_inner_secondary: f32,
    pub capture_outer_secondary: f32,
    /// Secondary slots open wider than the level's nominal gap
    pub secondary_gap_scale: f32,
    /// Distance from an occupied slot's center that counts as a hit
    pub hit_distance: f32,
    /// Cosmetic orbit rate of a captured particle
    pub orbit_speed: f32,

    // === Stun / knockout ===
    pub stun_base: f32,
    pub stun_step: f32,
    pub stun_max: f32,
    pub knockout_stun: f32,
    pub shake_duration: f32,
    pub rejection_refractory: f32,
    pub hit_refractory: f32,
    pub eject_refractory: f32,
    pub eject_speed_min: f32,
    pub eject_speed_max: f32,

    // === Storms ===
    /// Chance per tick of spawning a storm
    pub storm_spawn_chance: f32,
    pub max_storms: usize,
    pub storm_life_min: f32,
    pub storm_life_max: f32,
    pub storm_radius_floor: f32,
    pub storm_radius_min: f32,
    pub storm_radius_max: f32,
    pub storm_strength_min: f32,
    pub storm_strength_max: f32,
    pub storm_dead_zone: f32,
    pub storm_pulse_rate: f32,
    /// Storms spawn at least this far from the arena edge
    pub storm_margin: f32,

    // === Session ===
    pub time_limit_base: f32,
    pub time_limit_decay: f32,
    pub time_limit_floor: f32,
    pub time_warning_at: f32,
    pub advance_delay: f32,
    pub score_per_level: u64,

    // === Particle spawning ===
    pub spawn_margin: f32,
    pub spawn_clearance: f32,
    pub spawn_attempts: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pointer_radius: 120.0,
            pointer_accel: 540.0,
            slot_pull_radius: 60.0,
            slot_pull_accel: 360.0,
            wrong_kind_push_factor: 0.5,
            damping_per_tick: 0.98,
            wall_restitution: 0.8,
            wall_bounce_min_speed: 30.0,

            capture_inner_primary: 18.0,
            capture_outer_primary: 22.0,
            capture_inner_secondary: 15.0,
            capture_outer_secondary: 25.0,
            secondary_gap_scale: 1.4,
            hit_distance: 25.0,
            orbit_speed: 3.0,

            stun_base: 2.0,
            stun_step: 0.5,
            stun_max: 4.0,
            knockout_stun: 1.0,
            shake_duration: 0.4,
            rejection_refractory: 0.5,
            hit_refractory: 1.0,
            eject_refractory: 0.5,
            eject_speed_min: 120.0,
            eject_speed_max: 240.0,

            storm_spawn_chance: 0.004,
            max_storms: 3,
            storm_life_min: 4.0,
            storm_life_max: 8.0,
            storm_radius_floor: 8.0,
            storm_radius_min: 60.0,
            storm_radius_max: 120.0,
            storm_strength_min: 150.0,
            storm_strength_max: 300.0,
            storm_dead_zone: 1.0,
            storm_pulse_rate: 6.0,
            storm_margin: 80.0,

            time_limit_base: 45.0,
            time_limit_decay: 5.0,
            time_limit_floor: 20.0,
            time_warning_at: 10.0,
            advance_delay: 2.0,
            score_per_level: 100,

            spawn_margin: 100.0,
            spawn_clearance: 60.0,
            spawn_attempts: 10,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Capture band `(inner, outer)` around a slot's center for the given kind
    pub fn capture_band(&self, kind: ParticleKind) -> (f32, f32) {
        match kind {
            ParticleKind::Primary => (self.capture_inner_primary, self.capture_outer_primary),
            ParticleKind::Secondary => {
                (self.capture_inner_secondary, self.capture_outer_secondary)
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn check(ok: bool, name: &'static str, expected: &'static str) -> Result<(), TuningError> {
            if ok {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { name, expected })
            }
        }

        check(
            self.damping_per_tick > 0.0 && self.damping_per_tick <= 1.0,
            "damping_per_tick",
            "in (0, 1]",
        )?;
        check(
            (0.0..=1.0).contains(&self.wall_restitution),
            "wall_restitution",
            "in [0, 1]",
        )?;
        check(
            0.0 <= self.capture_inner_primary
                && self.capture_inner_primary < self.capture_outer_primary,
            "capture_inner_primary",
            "non-negative and below capture_outer_primary",
        )?;
        check(
            0.0 <= self.capture_inner_secondary
                && self.capture_inner_secondary < self.capture_outer_secondary,
            "capture_inner_secondary",
            "non-negative and below capture_outer_secondary",
        )?;
        check(self.stun_base > 0.0, "stun_base", "positive")?;
        check(self.stun_step >= 0.0, "stun_step", "non-negative")?;
        check(self.stun_max >= self.stun_base, "stun_max", "at least stun_base")?;
        check(
            self.knockout_stun > 0.0 && self.knockout_stun < self.stun_base,
            "knockout_stun",
            "positive and shorter than stun_base",
        )?;
        check(
            self.eject_speed_min <= self.eject_speed_max,
            "eject_speed_min",
            "at most eject_speed_max",
        )?;
        check(
            (0.0..=1.0).contains(&self.storm_spawn_chance),
            "storm_spawn_chance",
            "a probability in [0, 1]",
        )?;
        check(
            0.0 < self.storm_life_min && self.storm_life_min <= self.storm_life_max,
            "storm_life_min",
            "positive and at most storm_life_max",
        )?;
        check(
            0.0 < self.storm_radius_floor && self.storm_radius_floor < self.storm_radius_min,
            "storm_radius_floor",
            "positive and below storm_radius_min",
        )?;
        check(
            self.storm_radius_min <= self.storm_radius_max,
            "storm_radius_min",
            "at most storm_radius_max",
        )?;
        check(
            self.storm_strength_min <= self.storm_strength_max,
            "storm_strength_min",
            "at most storm_strength_max",
        )?;
        check(
            self.time_limit_floor > 0.0 && self.time_limit_floor <= self.time_limit_base,
            "time_limit_floor",
            "positive and at most time_limit_base",
        )?;
        check(self.time_limit_decay >= 0.0, "time_limit_decay", "non-negative")?;
        Ok(())
    }
}
