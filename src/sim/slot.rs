//! Capture slots and their state machine
//!
//! A slot is either empty with a rotating entry gap, or occupied by exactly one
//! particle. Two timed sub-states ride on top: `stun` (rejects every capture,
//! entered after a rule violation or a knockout) and `shake` (cosmetic, the first
//! hit on an occupied slot).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::ParticleKind;
use crate::catalog::SlotDefinition;
use crate::consts::SLOT_ORBIT_RADIUS;
use crate::tuning::Tuning;
use crate::{polar_to_cartesian, wrap_angle};

/// Hits on an occupied slot needed to knock its particle out
pub const KNOCKOUT_HITS: u8 = 2;

/// Stun duration for the given escalation count (1 = first offence)
///
/// Non-decreasing in `escalation_count` and never above `max`.
pub fn stun_duration(escalation_count: u32, base: f32, step: f32, max: f32) -> f32 {
    let extra = escalation_count.saturating_sub(1) as f32 * step;
    (base + extra).min(max)
}

/// Stun sub-state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stun {
    pub remaining: f32,
    /// Rule-violation stuns so far this level
    pub escalation_count: u32,
}

impl Stun {
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Cosmetic shake sub-state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub remaining: f32,
}

impl Shake {
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// What a registered hit did to an occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// First hit: the slot shakes
    Shaken,
    /// Second hit: this particle must be ejected
    KnockedOut { particle: u32 },
}

/// Coarse state for renderers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotPhase {
    EmptyRotating,
    Stunned,
    Occupied,
}

/// A capture target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Absolute arena position
    pub pos: Vec2,
    pub shell_radius: f32,
    /// Index into the level's ascending shell radii
    pub shell: usize,
    pub kind: ParticleKind,
    /// Captured particle id
    pub occupant: Option<u32>,
    /// Gap center angle (radians, [0, 2π))
    pub rotation_angle: f32,
    /// Radians/sec, fixed at level load
    pub angular_speed: f32,
    /// Full angular width of the entry opening
    pub gap_width: f32,
    pub stun: Stun,
    pub shake: Shake,
    pub hit_count: u8,
    /// Cosmetic phase of the captured particle
    pub orbit_angle: f32,
    /// Captures received since the level loaded
    pub entries: u32,
}

impl Slot {
    /// Build a slot from level data
    pub fn from_definition(
        def: &SlotDefinition,
        center: Vec2,
        shell: usize,
        rotation_angle: f32,
        tuning: &Tuning,
    ) -> Self {
        let gap_width = match def.kind {
            ParticleKind::Primary => def.gap,
            ParticleKind::Secondary => def.gap * tuning.secondary_gap_scale,
        };
        Self {
            pos: center + def.offset,
            shell_radius: def.shell_radius,
            shell,
            kind: def.kind,
            occupant: None,
            rotation_angle: wrap_angle(rotation_angle),
            angular_speed: def.angular_speed,
            gap_width: gap_width.min(std::f32::consts::TAU),
            stun: Stun::default(),
            shake: Shake::default(),
            hit_count: 0,
            orbit_angle: 0.0,
            entries: 0,
        }
    }

    pub fn occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn stunned(&self) -> bool {
        self.stun.active()
    }

    pub fn phase(&self) -> SlotPhase {
        if self.occupied() {
            SlotPhase::Occupied
        } else if self.stunned() {
            SlotPhase::Stunned
        } else {
            SlotPhase::EmptyRotating
        }
    }

    /// Open for a capture attempt (rules aside)
    pub fn accepting(&self) -> bool {
        !self.occupied() && !self.stunned()
    }

    /// Advance the gap (empty) or the orbiting particle (occupied)
    pub fn animate(&mut self, dt: f32, orbit_speed: f32) {
        if self.occupied() {
            self.orbit_angle = wrap_angle(self.orbit_angle + orbit_speed * dt);
        } else {
            self.rotation_angle = wrap_angle(self.rotation_angle + self.angular_speed * dt);
        }
    }

    /// Count down the stun and shake timers
    pub fn decay_timers(&mut self, dt: f32) {
        self.stun.remaining = (self.stun.remaining - dt).max(0.0);
        self.shake.remaining = (self.shake.remaining - dt).max(0.0);
    }

    /// Take a particle. Callers must have checked [`Self::accepting`].
    pub fn capture(&mut self, particle: u32) {
        debug_assert!(self.accepting(), "capture into a closed slot");
        self.occupant = Some(particle);
        self.hit_count = 0;
        self.entries += 1;
        self.orbit_angle = self.rotation_angle;
    }

    /// Escalating stun after a rule violation; returns its duration
    pub fn stun_for_violation(&mut self, tuning: &Tuning) -> f32 {
        self.stun.escalation_count += 1;
        let duration = stun_duration(
            self.stun.escalation_count,
            tuning.stun_base,
            tuning.stun_step,
            tuning.stun_max,
        );
        self.stun.remaining = duration;
        duration
    }

    /// Register a collision against the occupant
    ///
    /// Returns `None` when the slot is empty (nothing to hit).
    pub fn register_hit(&mut self, tuning: &Tuning) -> Option<HitOutcome> {
        let particle = self.occupant?;
        self.hit_count += 1;
        if self.hit_count >= KNOCKOUT_HITS {
            self.hit_count = 0;
            self.occupant = None;
            self.shake.remaining = 0.0;
            // Short lockout so the ejected particle can't be farmed straight back in
            self.stun.remaining = tuning.knockout_stun;
            Some(HitOutcome::KnockedOut { particle })
        } else {
            self.shake.remaining = tuning.shake_duration;
            Some(HitOutcome::Shaken)
        }
    }

    /// Where the renderer draws the captured particle
    pub fn orbit_point(&self) -> Vec2 {
        self.pos + polar_to_cartesian(SLOT_ORBIT_RADIUS, self.orbit_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slot(kind: ParticleKind) -> Slot {
        let def = SlotDefinition::new(Vec2::new(80.0, 0.0), 80.0, kind, 0.3, 1.2);
        Slot::from_definition(&def, Vec2::new(400.0, 300.0), 0, 0.0, &Tuning::default())
    }

    #[test]
    fn test_secondary_gap_is_wider() {
        assert!((slot(ParticleKind::Primary).gap_width - 0.3).abs() < 1e-6);
        assert!((slot(ParticleKind::Secondary).gap_width - 0.42).abs() < 1e-6);
        assert_eq!(slot(ParticleKind::Primary).pos, Vec2::new(480.0, 300.0));
    }

    #[test]
    fn test_rotation_only_while_empty() {
        let mut s = slot(ParticleKind::Primary);
        s.animate(0.5, 3.0);
        assert!((s.rotation_angle - 0.6).abs() < 1e-5);

        s.capture(7);
        let frozen = s.rotation_angle;
        s.animate(0.5, 3.0);
        assert_eq!(s.rotation_angle, frozen);
        assert!(s.orbit_angle != frozen);
        let drawn = s.orbit_point().distance(s.pos);
        assert!((drawn - SLOT_ORBIT_RADIUS).abs() < 1e-3);
    }

    #[test]
    fn test_capture_resets_hits_and_counts_entry() {
        let mut s = slot(ParticleKind::Primary);
        s.capture(1);
        assert_eq!(s.phase(), SlotPhase::Occupied);
        assert_eq!(s.entries, 1);
        assert_eq!(s.hit_count, 0);
        assert!(!s.accepting());
    }

    #[test]
    fn test_violation_stun_escalates() {
        let tuning = Tuning::default();
        let mut s = slot(ParticleKind::Primary);
        assert_eq!(s.stun_for_violation(&tuning), 2.0);
        assert_eq!(s.phase(), SlotPhase::Stunned);
        assert_eq!(s.stun_for_violation(&tuning), 2.5);
        for _ in 0..10 {
            s.stun_for_violation(&tuning);
        }
        assert_eq!(s.stun.remaining, 4.0);

        s.decay_timers(10.0);
        assert_eq!(s.phase(), SlotPhase::EmptyRotating);
        // Escalation survives the stun wearing off
        assert_eq!(s.stun.escalation_count, 12);
    }

    #[test]
    fn test_second_hit_knocks_out() {
        let tuning = Tuning::default();
        let mut s = slot(ParticleKind::Primary);
        assert_eq!(s.register_hit(&tuning), None);

        s.capture(9);
        assert_eq!(s.register_hit(&tuning), Some(HitOutcome::Shaken));
        assert!(s.shake.active());
        assert!(s.occupied());

        assert_eq!(
            s.register_hit(&tuning),
            Some(HitOutcome::KnockedOut { particle: 9 })
        );
        assert!(!s.occupied());
        assert_eq!(s.hit_count, 0);
        assert_eq!(s.stun.remaining, tuning.knockout_stun);
        // Knockout lockout does not count as an offence
        assert_eq!(s.stun.escalation_count, 0);
    }

    proptest! {
        #[test]
        fn prop_stun_duration_monotone_and_capped(
            count in 0u32..1000,
            base in 0.1f32..5.0,
            step in 0.0f32..2.0,
            headroom in 0.0f32..10.0,
        ) {
            let max = base + headroom;
            let now = stun_duration(count, base, step, max);
            let next = stun_duration(count + 1, base, step, max);
            prop_assert!(now <= next);
            prop_assert!(next <= max);
            prop_assert!(now >= base.min(max));
        }
    }
}
