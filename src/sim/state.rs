//! Level state and core simulation types
//!
//! Everything rebuilt when a level loads or resets lives in [`LevelState`].
//! Storms outlive a level and are owned by the engine instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::Particle;
use super::rng::RandomSource;
use super::slot::Slot;
use crate::arena_center;
use crate::catalog::LevelDefinition;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::tuning::Tuning;

/// The two particle/slot tiers within a shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Filled first in each shell (s-like)
    Primary,
    /// Filled after the shell's Primary slots (p-like)
    Secondary,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 2] = [ParticleKind::Primary, ParticleKind::Secondary];
}

/// Slots and particles of the level being played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    /// Slots in level-definition order
    pub slots: Vec<Slot>,
    /// Particles, in ascending id order
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl LevelState {
    /// Build the initial layout of a level
    pub fn load(def: &LevelDefinition, tuning: &Tuning, rng: &mut impl RandomSource) -> Self {
        let center = arena_center();
        let radii = def.shell_radii();
        let slots: Vec<Slot> = def
            .slots
            .iter()
            .map(|slot_def| {
                let shell = LevelDefinition::shell_index(&radii, slot_def.shell_radius);
                Slot::from_definition(slot_def, center, shell, rng.angle(), tuning)
            })
            .collect();

        let mut state = Self {
            slots,
            particles: Vec::new(),
            next_id: 1,
        };

        // One particle per slot of each kind
        for kind in ParticleKind::ALL {
            for _ in 0..def.count_of(kind) {
                let pos = state.spawn_point(tuning, rng);
                let id = state.next_entity_id();
                state.particles.push(Particle::new(id, pos, kind));
            }
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Random point inside the margin, preferring spots clear of every slot
    fn spawn_point(&self, tuning: &Tuning, rng: &mut impl RandomSource) -> Vec2 {
        let margin = tuning
            .spawn_margin
            .min(ARENA_WIDTH / 2.0)
            .min(ARENA_HEIGHT / 2.0);
        let mut point = Vec2::ZERO;
        for _ in 0..tuning.spawn_attempts.max(1) {
            point = Vec2::new(
                rng.range(margin, ARENA_WIDTH - margin),
                rng.range(margin, ARENA_HEIGHT - margin),
            );
            let clear = self
                .slots
                .iter()
                .all(|s| s.pos.distance(point) >= tuning.spawn_clearance);
            if clear {
                break;
            }
        }
        point
    }

    /// Every slot is occupied
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Slot::occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied()).count()
    }

    pub fn particle_mut(&mut self, id: u32) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::sim::rng::{ScriptedRng, seeded};

    #[test]
    fn test_load_builds_slots_and_particles() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let state = LevelState::load(catalog.level(4), &tuning, &mut seeded(1));

        assert_eq!(state.slots.len(), 7);
        assert_eq!(state.particles.len(), 7);
        let secondaries = state
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Secondary)
            .count();
        assert_eq!(secondaries, 3);
        assert_eq!(state.slots[0].shell, 0);
        assert_eq!(state.slots[6].shell, 1);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_spawn_points_avoid_slots_when_possible() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let state = LevelState::load(catalog.level(3), &tuning, &mut seeded(99));
        for p in &state.particles {
            assert!(p.pos.x >= tuning.spawn_margin && p.pos.x <= ARENA_WIDTH - tuning.spawn_margin);
        }
    }

    #[test]
    fn test_completion_is_idempotent() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let mut rng = ScriptedRng::constant(0.1);
        let mut state = LevelState::load(catalog.level(1), &tuning, &mut rng);
        state.slots[0].capture(1);
        assert!(!state.is_complete());
        state.slots[1].capture(2);
        assert!(state.is_complete());
        assert!(state.is_complete());
        assert_eq!(state.occupied_count(), 2);
    }
}
