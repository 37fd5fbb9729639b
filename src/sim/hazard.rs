//! Storms: transient radial force emitters
//!
//! Storms only appear once the catalog has wrapped at least once. Each one
//! swells from a small floor radius to its peak and back over its life, pushing
//! nearby free particles outward with a pulsing strength.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::tuning::Tuning;

/// A storm instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storm {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub floor_radius: f32,
    pub max_radius: f32,
    pub life: f32,
    pub max_life: f32,
    pub strength: f32,
    pub pulse_phase: f32,
}

impl Storm {
    /// Roll a new storm anywhere inside the margin-inset arena
    pub fn spawn(id: u32, tuning: &Tuning, rng: &mut impl RandomSource) -> Self {
        let margin = tuning
            .storm_margin
            .min(ARENA_WIDTH / 2.0)
            .min(ARENA_HEIGHT / 2.0);
        let pos = Vec2::new(
            rng.range(margin, ARENA_WIDTH - margin),
            rng.range(margin, ARENA_HEIGHT - margin),
        );
        let max_life = rng.range(tuning.storm_life_min, tuning.storm_life_max);
        let max_radius = rng.range(tuning.storm_radius_min, tuning.storm_radius_max);
        let strength = rng.range(tuning.storm_strength_min, tuning.storm_strength_max);
        Self {
            id,
            pos,
            radius: tuning.storm_radius_floor,
            floor_radius: tuning.storm_radius_floor,
            max_radius,
            life: max_life,
            max_life,
            strength,
            pulse_phase: 0.0,
        }
    }

    pub fn alive(&self) -> bool {
        self.life > 0.0
    }

    /// Radius for a given remaining life: rises then falls, clamped to
    /// `[floor, max_radius]`
    pub fn radius_at(&self, life: f32) -> f32 {
        let progress = (1.0 - life / self.max_life).clamp(0.0, 1.0);
        let swell = (PI * progress).sin();
        (self.floor_radius + (self.max_radius - self.floor_radius) * swell)
            .clamp(self.floor_radius, self.max_radius)
    }

    /// Age by `dt`
    pub fn update(&mut self, dt: f32, pulse_rate: f32) {
        self.life -= dt;
        self.radius = self.radius_at(self.life.max(0.0));
        self.pulse_phase += pulse_rate * dt;
    }

    /// Current strength multiplier in [0.5, 1.0]
    pub fn pulse(&self) -> f32 {
        0.75 + 0.25 * self.pulse_phase.sin()
    }

    /// Outward acceleration on a point; zero outside the radius or inside the dead zone
    pub fn accel_on(&self, point: Vec2, dead_zone: f32) -> Vec2 {
        if !self.alive() {
            return Vec2::ZERO;
        }
        let offset = point - self.pos;
        let dist = offset.length();
        if dist >= self.radius || dist <= dead_zone.max(crate::consts::MIN_DISTANCE) {
            return Vec2::ZERO;
        }
        let falloff = (self.radius - dist) / self.radius;
        offset / dist * self.strength * self.pulse() * falloff
    }
}

/// Owns the live storms and spawns new ones
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StormField {
    pub storms: Vec<Storm>,
    next_id: u32,
}

impl StormField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.storms.clear();
    }

    pub fn len(&self) -> usize {
        self.storms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storms.is_empty()
    }

    /// Age every storm and drop the expired ones
    pub fn update(&mut self, dt: f32, tuning: &Tuning) {
        for storm in &mut self.storms {
            storm.update(dt, tuning.storm_pulse_rate);
        }
        self.storms.retain(Storm::alive);
    }

    /// One spawn roll; returns the new storm's id if one appeared
    pub fn try_spawn(&mut self, tuning: &Tuning, rng: &mut impl RandomSource) -> Option<u32> {
        if self.storms.len() >= tuning.max_storms || !rng.chance(tuning.storm_spawn_chance) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let storm = Storm::spawn(id, tuning, rng);
        log::debug!(
            "Storm {} spawned at ({:.0}, {:.0}) peak radius {:.0}",
            id,
            storm.pos.x,
            storm.pos.y,
            storm.max_radius
        );
        self.storms.push(storm);
        Some(id)
    }
}
