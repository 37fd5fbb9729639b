//! Capture gate: may this particle enter this slot right now?
//!
//! A particle is in range when its distance to the slot center lies inside the
//! kind's capture band, which straddles the slot's ring. In range, the particle's
//! bearing from the center must fall inside the rotating opening, and the
//! configuration rules get the final say.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::slot::Slot;
use super::state::ParticleKind;
use crate::consts::MIN_DISTANCE;
use crate::tuning::Tuning;
use crate::wrap_angle;

/// Why a slot stunned itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StunCause {
    /// Particle kind does not match the slot
    WrongKind,
    /// Right kind, but the configuration rules forbid this slot yet
    WrongOrder,
}

/// Outcome of one particle-slot encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Not inside the capture band
    OutOfRange,
    /// Occupied or stunned: nothing happens here
    Closed,
    Capture,
    Stun(StunCause),
    /// Right kind, but the opening was elsewhere
    Bounce,
}

/// Is `bearing` inside an opening of `gap_width` centered on `rotation`?
pub fn within_gap(bearing: f32, rotation: f32, gap_width: f32) -> bool {
    let half = gap_width / 2.0;
    let relative = wrap_angle(bearing - rotation);
    relative < half || relative > TAU - half
}

/// Bearing of `point` seen from `center`, guarded against coincident points
pub fn bearing(center: Vec2, point: Vec2) -> f32 {
    let delta = point - center;
    if delta.length_squared() < MIN_DISTANCE * MIN_DISTANCE {
        return 0.0;
    }
    delta.y.atan2(delta.x)
}

/// Inside the capture band for the slot's kind
pub fn in_capture_band(slot: &Slot, point: Vec2, tuning: &Tuning) -> bool {
    let (inner, outer) = tuning.capture_band(slot.kind);
    let dist = slot.pos.distance(point);
    dist >= inner && dist <= outer
}

/// Resolve an encounter. `rules_allow` is consulted only when geometry and kind
/// both pass.
pub fn evaluate(
    slot: &Slot,
    point: Vec2,
    kind: ParticleKind,
    tuning: &Tuning,
    rules_allow: impl FnOnce() -> bool,
) -> GateVerdict {
    if !in_capture_band(slot, point, tuning) {
        return GateVerdict::OutOfRange;
    }
    if !slot.accepting() {
        return GateVerdict::Closed;
    }
    if kind != slot.kind {
        return GateVerdict::Stun(StunCause::WrongKind);
    }
    if !within_gap(bearing(slot.pos, point), slot.rotation_angle, slot.gap_width) {
        return GateVerdict::Bounce;
    }
    if rules_allow() {
        GateVerdict::Capture
    } else {
        GateVerdict::Stun(StunCause::WrongOrder)
    }
}
