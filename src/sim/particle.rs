//! Particle motion model
//!
//! Velocities are px/s and accelerations px/s². Each tick a free particle
//! accumulates pointer, slot and storm accelerations, integrates, is damped, and
//! reflects off the arena walls. A particle with a running `inactive_timer`
//! skips the external forces but still integrates and bounces.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazard::Storm;
use super::slot::Slot;
use super::state::ParticleKind;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, MIN_DISTANCE, PARTICLE_RADIUS, SIM_DT};
use crate::tuning::Tuning;

/// A mobile particle (electron)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Slot index while captured
    pub captured_in: Option<usize>,
    /// Refractory seconds left after a rejection, hit or ejection
    pub inactive_timer: f32,
}

impl Particle {
    pub fn new(id: u32, pos: Vec2, kind: ParticleKind) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            kind,
            captured_in: None,
            inactive_timer: 0.0,
        }
    }

    pub fn captured(&self) -> bool {
        self.captured_in.is_some()
    }

    pub fn inactive(&self) -> bool {
        self.inactive_timer > 0.0
    }

    /// Free and outside any refractory period
    pub fn active(&self) -> bool {
        !self.captured() && !self.inactive()
    }

    pub fn set_refractory(&mut self, seconds: f32) {
        self.inactive_timer = self.inactive_timer.max(seconds);
    }

    pub fn decay_refractory(&mut self, dt: f32) {
        self.inactive_timer = (self.inactive_timer - dt).max(0.0);
    }

    /// Snap into a slot
    pub fn capture(&mut self, slot_index: usize, slot_pos: Vec2) {
        self.captured_in = Some(slot_index);
        self.pos = slot_pos;
        self.vel = Vec2::ZERO;
        self.inactive_timer = 0.0;
    }

    /// Leave a slot with an outward kick, placed just beyond `clearance`
    pub fn eject(
        &mut self,
        slot_pos: Vec2,
        angle: f32,
        speed: f32,
        clearance: f32,
        refractory: f32,
    ) {
        let dir = Vec2::new(angle.cos(), angle.sin());
        self.captured_in = None;
        self.pos = slot_pos + dir * clearance;
        self.vel = dir * speed;
        self.inactive_timer = refractory;
    }

    /// Reflect off a circle centered at `center`, ending at least `radius` away
    pub fn bounce_off(&mut self, center: Vec2, radius: f32) {
        let offset = self.pos - center;
        let dist = offset.length().max(MIN_DISTANCE);
        let normal = offset / dist;
        if self.vel.dot(normal) < 0.0 {
            self.vel = reflect(self.vel, normal);
        }
        if dist < radius {
            self.pos = center + normal * radius;
        }
    }
}

/// Reflect a velocity about a unit normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// Pointer acceleration: Primary particles are pulled in, Secondary pushed away
pub fn pointer_accel(particle: &Particle, pointer: Vec2, tuning: &Tuning) -> Vec2 {
    let delta = pointer - particle.pos;
    let dist = delta.length();
    if dist >= tuning.pointer_radius || dist < MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let falloff = (tuning.pointer_radius - dist) / tuning.pointer_radius;
    let toward = delta / dist * tuning.pointer_accel * falloff;
    match particle.kind {
        ParticleKind::Primary => toward,
        ParticleKind::Secondary => -toward,
    }
}

/// Slot acceleration: accepting slots attract their kind and repel the other
pub fn slot_accel(particle: &Particle, slot: &Slot, tuning: &Tuning) -> Vec2 {
    if !slot.accepting() {
        return Vec2::ZERO;
    }
    let delta = slot.pos - particle.pos;
    let dist = delta.length();
    if dist >= tuning.slot_pull_radius || dist < MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let falloff = (tuning.slot_pull_radius - dist) / tuning.slot_pull_radius;
    let toward = delta / dist * tuning.slot_pull_accel * falloff;
    if particle.kind == slot.kind {
        toward
    } else {
        -toward * tuning.wrong_kind_push_factor
    }
}

/// Sum of every external acceleration acting on a free, active particle
pub fn external_accel(
    particle: &Particle,
    pointer: Option<Vec2>,
    slots: &[Slot],
    storms: &[Storm],
    tuning: &Tuning,
) -> Vec2 {
    if !particle.active() {
        return Vec2::ZERO;
    }
    let mut accel = Vec2::ZERO;
    if let Some(pointer) = pointer {
        accel += pointer_accel(particle, pointer, tuning);
    }
    for slot in slots {
        accel += slot_accel(particle, slot, tuning);
    }
    for storm in storms {
        accel += storm.accel_on(particle.pos, tuning.storm_dead_zone);
    }
    accel
}

/// Integrate one step and resolve wall contact
///
/// Returns the impact speed if the particle hit a wall this step.
pub fn integrate(particle: &mut Particle, accel: Vec2, dt: f32, tuning: &Tuning) -> Option<f32> {
    if particle.captured() {
        return None;
    }
    particle.vel += accel * dt;
    particle.pos += particle.vel * dt;
    // Damping is authored per 60 Hz tick
    particle.vel *= tuning.damping_per_tick.powf(dt / SIM_DT);

    let speed = particle.vel.length();
    let mut hit_wall = false;
    let (min_x, max_x) = (PARTICLE_RADIUS, ARENA_WIDTH - PARTICLE_RADIUS);
    let (min_y, max_y) = (PARTICLE_RADIUS, ARENA_HEIGHT - PARTICLE_RADIUS);

    if particle.pos.x < min_x {
        particle.pos.x = min_x;
        particle.vel.x = particle.vel.x.abs() * tuning.wall_restitution;
        hit_wall = true;
    } else if particle.pos.x > max_x {
        particle.pos.x = max_x;
        particle.vel.x = -particle.vel.x.abs() * tuning.wall_restitution;
        hit_wall = true;
    }
    if particle.pos.y < min_y {
        particle.pos.y = min_y;
        particle.vel.y = particle.vel.y.abs() * tuning.wall_restitution;
        hit_wall = true;
    } else if particle.pos.y > max_y {
        particle.pos.y = max_y;
        particle.vel.y = -particle.vel.y.abs() * tuning.wall_restitution;
        hit_wall = true;
    }

    (hit_wall && speed >= tuning.wall_bounce_min_speed).then_some(speed)
}
