//! Fixed timestep simulation tick
//!
//! One pass, in order: storms, particle forces and integration, capture-gate
//! and hit resolution, timer decay, then completion and progression.

use glam::Vec2;

use super::engine::Engine;
use super::events::EngineEvent;
use super::gate::{self, GateVerdict, StunCause};
use super::particle::{external_accel, integrate};
use super::rng::RandomSource;
use super::rules;
use super::session::ClockOutcome;
use super::slot::HitOutcome;
use super::state::LevelState;
use crate::consts::PARTICLE_RADIUS;
use crate::tuning::Tuning;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in arena coordinates (None when off the arena)
    pub pointer: Option<Vec2>,
    /// Acknowledge a completed level (click to continue)
    pub advance: bool,
    /// Start the whole run over
    pub restart: bool,
}

impl TickInput {
    pub fn pointer_at(pointer: Vec2) -> Self {
        Self {
            pointer: Some(pointer),
            ..Default::default()
        }
    }
}

/// Advance the engine by one timestep
pub fn tick<R: RandomSource>(
    engine: &mut Engine<R>,
    input: &TickInput,
    dt: f32,
) -> Vec<EngineEvent> {
    let mut events = Vec::new();

    if input.restart {
        engine.restart_run(&mut events);
    }

    engine.time_ticks += 1;
    let playing = engine.progression.playing();

    // Storms
    if playing {
        engine.storms.update(dt, &engine.tuning);
        let storms_enabled =
            engine.settings.hazards && engine.progression.state().cycle_count > 0;
        if storms_enabled {
            if let Some(storm) = engine.storms.try_spawn(&engine.tuning, &mut engine.rng) {
                events.push(EngineEvent::StormSpawned { storm });
            }
        }
    }

    for slot in &mut engine.level.slots {
        slot.animate(dt, engine.tuning.orbit_speed);
    }

    if playing {
        move_particles(engine, input.pointer, dt, &mut events);
        resolve_encounters(
            &mut engine.level,
            &engine.tuning,
            &mut engine.rng,
            &mut events,
        );
    }

    // Timers
    for slot in &mut engine.level.slots {
        slot.decay_timers(dt);
    }
    for particle in &mut engine.level.particles {
        particle.decay_refractory(dt);
    }

    if playing {
        check_progress(engine, dt, &mut events);
    } else if engine
        .progression
        .advance_due(dt, input.advance, engine.settings.auto_advance)
    {
        advance_level(engine, &mut events);
    }

    events
}

/// Forces, integration and wall contact for every free particle
fn move_particles<R: RandomSource>(
    engine: &mut Engine<R>,
    pointer: Option<Vec2>,
    dt: f32,
    events: &mut Vec<EngineEvent>,
) {
    let level = &mut engine.level;
    let tuning = &engine.tuning;
    let storms = &engine.storms.storms;

    for i in 0..level.particles.len() {
        if let Some(slot) = level.particles[i].captured_in {
            // Captured particles ride with their slot
            level.particles[i].pos = level.slots[slot].pos;
            continue;
        }
        let accel = external_accel(&level.particles[i], pointer, &level.slots, storms, tuning);
        let particle = &mut level.particles[i];
        if let Some(speed) = integrate(particle, accel, dt, tuning) {
            events.push(EngineEvent::WallBounce {
                particle: particle.id,
                speed,
            });
        }
    }
}

/// Gate, rules, hits and knockouts for every active particle near a slot
fn resolve_encounters(
    level: &mut LevelState,
    tuning: &Tuning,
    rng: &mut impl RandomSource,
    events: &mut Vec<EngineEvent>,
) {
    for pi in 0..level.particles.len() {
        if !level.particles[pi].active() {
            continue;
        }
        let (pos, kind, particle) = {
            let p = &level.particles[pi];
            (p.pos, p.kind, p.id)
        };

        for si in 0..level.slots.len() {
            let slot_pos = level.slots[si].pos;

            if level.slots[si].occupied() {
                if slot_pos.distance(pos) < tuning.hit_distance {
                    hit_occupied(level, si, pi, tuning, rng, events);
                    break;
                }
                continue;
            }

            let verdict = gate::evaluate(&level.slots[si], pos, kind, tuning, || {
                rules::allows(&level.slots, si)
            });
            let (_, band_outer) = tuning.capture_band(level.slots[si].kind);

            match verdict {
                GateVerdict::OutOfRange | GateVerdict::Closed => continue,
                GateVerdict::Capture => {
                    level.slots[si].capture(particle);
                    level.particles[pi].capture(si, slot_pos);
                    log::debug!("Particle {} captured by slot {}", particle, si);
                    events.push(EngineEvent::Capture { slot: si, particle });
                }
                GateVerdict::Bounce => {
                    level.particles[pi].bounce_off(slot_pos, band_outer + 0.5);
                }
                GateVerdict::Stun(cause) => {
                    let violation = match cause {
                        StunCause::WrongOrder => rules::check(&level.slots, si).err(),
                        StunCause::WrongKind => None,
                    };
                    let duration = level.slots[si].stun_for_violation(tuning);
                    let escalation = level.slots[si].stun.escalation_count;
                    let p = &mut level.particles[pi];
                    p.bounce_off(slot_pos, band_outer + 0.5);
                    p.set_refractory(tuning.rejection_refractory);
                    log::debug!(
                        "Slot {} stunned for {:.2}s ({:?}, escalation {})",
                        si,
                        duration,
                        cause,
                        escalation
                    );
                    events.push(EngineEvent::Stun {
                        slot: si,
                        particle,
                        cause,
                        violation,
                        duration,
                        escalation,
                    });
                }
            }
            break;
        }
    }
}

/// A free particle ran into an occupied slot
fn hit_occupied(
    level: &mut LevelState,
    si: usize,
    pi: usize,
    tuning: &Tuning,
    rng: &mut impl RandomSource,
    events: &mut Vec<EngineEvent>,
) {
    let Some(outcome) = level.slots[si].register_hit(tuning) else {
        return;
    };
    let slot_pos = level.slots[si].pos;
    let hitter = {
        let p = &mut level.particles[pi];
        p.bounce_off(slot_pos, tuning.hit_distance);
        p.set_refractory(tuning.hit_refractory);
        p.id
    };

    match outcome {
        HitOutcome::Shaken => {
            events.push(EngineEvent::Hit {
                slot: si,
                particle: hitter,
            });
        }
        HitOutcome::KnockedOut { particle } => {
            let angle = rng.angle();
            let speed = rng.range(tuning.eject_speed_min, tuning.eject_speed_max);
            let (_, band_outer) = tuning.capture_band(level.slots[si].kind);
            let clearance = band_outer.max(tuning.hit_distance) + PARTICLE_RADIUS + 2.0;
            if let Some(ejected) = level.particle_mut(particle) {
                ejected.eject(slot_pos, angle, speed, clearance, tuning.eject_refractory);
            }
            log::debug!("Slot {} knocked out particle {} (hit by {})", si, particle, hitter);
            events.push(EngineEvent::Knockout {
                slot: si,
                particle,
                hitter,
            });
        }
    }
}

/// Completion, clock and timeout handling while playing
fn check_progress<R: RandomSource>(engine: &mut Engine<R>, dt: f32, events: &mut Vec<EngineEvent>) {
    let clock = engine
        .progression
        .tick_clock(dt, &engine.tuning, &engine.settings);
    let level = engine.progression.level_index();

    if engine.level.is_complete() {
        if let Some(level_time) = engine.progression.complete_level(&engine.tuning) {
            events.push(EngineEvent::LevelComplete {
                level,
                score: engine.progression.state().score,
                level_time,
            });
        }
        return;
    }

    match clock {
        ClockOutcome::Running => {}
        ClockOutcome::Warning { remaining } => {
            events.push(EngineEvent::TimeWarning { remaining });
        }
        ClockOutcome::Timeout => {
            engine.progression.on_timeout();
            engine.storms.clear();
            engine.reload_level();
            events.push(EngineEvent::Timeout { level });
        }
    }
}

/// Move past a completed level, wrapping into the next cycle when needed
fn advance_level<R: RandomSource>(engine: &mut Engine<R>, events: &mut Vec<EngineEvent>) {
    let advance = engine.progression.advance(&engine.tuning, &engine.settings);

    if let Some(summary) = advance.wrapped {
        engine.storms.clear();
        events.push(EngineEvent::CycleAdvance {
            cycle: summary.cycle,
            time_limit: summary.time_limit,
            pass_time: summary.pass_time,
        });
        if let Some((seconds, previous)) = summary.new_best {
            events.push(EngineEvent::NewBestTime { seconds, previous });
        }
    }

    engine.reload_level();
    log::info!(
        "Level {} ({}) started",
        advance.level_index,
        engine.current_level().name
    );
    events.push(EngineEvent::LevelStarted {
        level: advance.level_index,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, LevelDefinition, SlotDefinition};
    use crate::consts::{SIM_DT, SLOT_RING_RADIUS};
    use crate::persistence::MemoryStore;
    use crate::polar_to_cartesian;
    use crate::settings::Settings;
    use crate::sim::hazard::Storm;
    use crate::sim::rng::ScriptedRng;
    use crate::sim::slot::SlotPhase;
    use crate::sim::state::ParticleKind;
    use crate::sim::session::SessionPhase;

    fn level(slots: Vec<SlotDefinition>) -> LevelDefinition {
        LevelDefinition {
            name: "Test".into(),
            symbol: "T".into(),
            atomic_number: 1,
            fact: String::new(),
            slots,
        }
    }

    /// Stationary gaps so geometry is exact
    fn still(offset: Vec2, shell_radius: f32, kind: ParticleKind) -> SlotDefinition {
        SlotDefinition::new(offset, shell_radius, kind, 0.3, 0.0)
    }

    fn engine_for(levels: Vec<LevelDefinition>, settings: Settings) -> Engine<ScriptedRng> {
        Engine::new(
            Catalog::new(levels).unwrap(),
            Tuning::default(),
            settings,
            Box::new(MemoryStore::new()),
            // Every draw 0: slot gaps face +x, ejections go +x at minimum speed
            ScriptedRng::constant(0.0),
        )
        .unwrap()
    }

    /// Park a particle inside a slot's opening, at rest
    fn place_in_gap(engine: &mut Engine<ScriptedRng>, particle: usize, slot: usize) {
        let s = &engine.level.slots[slot];
        let pos = s.pos + polar_to_cartesian(SLOT_RING_RADIUS, s.rotation_angle);
        let p = &mut engine.level.particles[particle];
        p.pos = pos;
        p.vel = Vec2::ZERO;
        p.inactive_timer = 0.0;
    }

    /// Park every particle far from all slots
    fn park_all(engine: &mut Engine<ScriptedRng>) {
        for (i, p) in engine.level.particles.iter_mut().enumerate() {
            p.pos = Vec2::new(40.0 + i as f32 * 20.0, 40.0);
            p.vel = Vec2::ZERO;
        }
    }

    fn step(engine: &mut Engine<ScriptedRng>) -> Vec<EngineEvent> {
        tick(engine, &TickInput::default(), SIM_DT)
    }

    /// Two Primary slots in the inner shell, one Secondary slot further out
    fn ordering_level() -> LevelDefinition {
        level(vec![
            still(Vec2::new(80.0, 0.0), 80.0, ParticleKind::Primary),
            still(Vec2::new(-80.0, 0.0), 80.0, ParticleKind::Primary),
            still(Vec2::new(0.0, 140.0), 80.0, ParticleKind::Secondary),
        ])
    }

    fn particle_of(engine: &Engine<ScriptedRng>, kind: ParticleKind) -> usize {
        engine
            .level
            .particles
            .iter()
            .position(|p| p.kind == kind && !p.captured())
            .unwrap()
    }

    #[test]
    fn test_capture_snaps_particle_and_fills_slot() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);

        let events = step(&mut engine);
        assert!(events.contains(&EngineEvent::Capture { slot: 0, particle: 1 }));
        assert_eq!(engine.level.slots[0].phase(), SlotPhase::Occupied);
        assert_eq!(engine.level.particles[0].pos, engine.level.slots[0].pos);
        assert_eq!(engine.level.particles[0].captured_in, Some(0));
    }

    #[test]
    fn test_secondary_before_primaries_is_stunned_then_allowed() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        let secondary = particle_of(&engine, ParticleKind::Secondary);

        // Right kind, right gap, wrong order
        place_in_gap(&mut engine, secondary, 2);
        let events = step(&mut engine);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::Stun {
                slot: 2,
                cause: StunCause::WrongOrder,
                ..
            }
        )));
        assert!(!engine.level.slots[2].occupied());

        // Fill both primaries
        place_in_gap(&mut engine, 0, 0);
        step(&mut engine);
        place_in_gap(&mut engine, 1, 1);
        step(&mut engine);
        assert!(engine.level.slots[0].occupied() && engine.level.slots[1].occupied());

        // Let the stun wear off, then the same attempt succeeds
        engine.level.slots[2].stun.remaining = 0.0;
        place_in_gap(&mut engine, secondary, 2);
        let events = step(&mut engine);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::Capture { slot: 2, .. })));
    }

    #[test]
    fn test_wrong_kind_stuns_and_escalates() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        let secondary = particle_of(&engine, ParticleKind::Secondary);

        place_in_gap(&mut engine, secondary, 0);
        step(&mut engine);
        let first = engine.level.slots[0].stun.remaining;
        assert!(engine.level.slots[0].stunned());

        engine.level.slots[0].stun.remaining = 0.0;
        place_in_gap(&mut engine, secondary, 0);
        let events = step(&mut engine);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::Stun {
                cause: StunCause::WrongKind,
                escalation: 2,
                ..
            }
        )));
        assert!(engine.level.slots[0].stun.remaining > first);
    }

    #[test]
    fn test_stunned_slot_never_captures() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        engine.level.slots[0].stun.remaining = 5.0;
        place_in_gap(&mut engine, 0, 0);
        let events = step(&mut engine);
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::Capture { .. })));
        assert!(!engine.level.slots[0].occupied());
    }

    #[test]
    fn test_misaligned_matching_particle_bounces() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        let s = engine.level.slots[0].pos;
        // Opening faces +x; approach from -x
        engine.level.particles[0].pos = s + Vec2::new(-20.0, 0.0);
        engine.level.particles[0].vel = Vec2::new(30.0, 0.0);
        let events = step(&mut engine);
        assert!(events.is_empty());
        assert!(!engine.level.slots[0].occupied());
        assert!(!engine.level.slots[0].stunned());
        assert!(engine.level.particles[0].vel.x < 0.0);
    }

    #[test]
    fn test_two_hits_knock_out() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);
        step(&mut engine);
        assert!(engine.level.slots[0].occupied());

        let slot_pos = engine.level.slots[0].pos;
        let hit = |engine: &mut Engine<ScriptedRng>| {
            let p = &mut engine.level.particles[1];
            p.pos = slot_pos + Vec2::new(0.0, -23.0);
            p.vel = Vec2::ZERO;
            p.inactive_timer = 0.0;
            step(engine)
        };

        let events = hit(&mut engine);
        assert!(events.contains(&EngineEvent::Hit { slot: 0, particle: 2 }));
        assert!(engine.level.slots[0].occupied());
        assert!(engine.level.slots[0].shake.active());

        let events = hit(&mut engine);
        assert!(events.contains(&EngineEvent::Knockout {
            slot: 0,
            particle: 1,
            hitter: 2
        }));
        let slot = &engine.level.slots[0];
        assert_eq!(slot.phase(), SlotPhase::Stunned);
        assert_eq!(slot.hit_count, 0);
        let ejected = &engine.level.particles[0];
        assert!(!ejected.captured());
        assert!(ejected.inactive());
        assert!(ejected.vel.x >= Tuning::default().eject_speed_min * 0.9);
    }

    #[test]
    fn test_completion_then_auto_advance() {
        let levels = vec![
            level(vec![still(Vec2::new(80.0, 0.0), 80.0, ParticleKind::Primary)]),
            ordering_level(),
        ];
        let mut engine = engine_for(levels, Settings::default());
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);

        let events = step(&mut engine);
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::LevelComplete { level: 0, score: 100, .. }
        )));
        assert!(matches!(
            engine.progression.state().phase,
            SessionPhase::LevelComplete { .. }
        ));

        let mut started = false;
        for _ in 0..200 {
            if step(&mut engine).contains(&EngineEvent::LevelStarted { level: 1 }) {
                started = true;
                break;
            }
        }
        assert!(started);
        assert_eq!(engine.level.slots.len(), 3);
    }

    #[test]
    fn test_manual_advance_waits_for_ack() {
        let settings = Settings {
            auto_advance: false,
            ..Settings::default()
        };
        let levels = vec![level(vec![still(Vec2::new(80.0, 0.0), 80.0, ParticleKind::Primary)])];
        let mut engine = engine_for(levels, settings);
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);
        step(&mut engine);

        for _ in 0..300 {
            let events = step(&mut engine);
            assert!(!events.iter().any(|e| matches!(e, EngineEvent::LevelStarted { .. })));
        }
        assert!(!engine.progression.playing());

        let ack = TickInput {
            advance: true,
            ..Default::default()
        };
        let events = tick(&mut engine, &ack, SIM_DT);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::CycleAdvance { cycle: 1, .. }))
        );
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::NewBestTime { previous: None, .. }))
        );
        assert!(events.contains(&EngineEvent::LevelStarted { level: 0 }));
        assert_eq!(engine.progression.state().cycle_count, 1);
    }

    #[test]
    fn test_timeout_resets_level_in_place() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);
        step(&mut engine);
        assert_eq!(engine.level.occupied_count(), 1);

        let mut timed_out = false;
        let mut warned = false;
        for _ in 0..(50 * 60) {
            // Keep everything far away so nothing else happens
            park_all(&mut engine);
            let events = step(&mut engine);
            warned |= events.iter().any(|e| matches!(e, EngineEvent::TimeWarning { .. }));
            if events.contains(&EngineEvent::Timeout { level: 0 }) {
                timed_out = true;
                break;
            }
        }
        assert!(warned);
        assert!(timed_out);
        assert_eq!(engine.level.occupied_count(), 0);
        assert_eq!(engine.progression.state().level_index, 0);
        assert_eq!(engine.progression.state().level_elapsed, 0.0);
    }

    #[test]
    fn test_relaxed_mode_never_times_out() {
        let mut engine = engine_for(vec![ordering_level()], Settings::relaxed());
        for _ in 0..(60 * 60) {
            park_all(&mut engine);
            let events = step(&mut engine);
            assert!(!events.contains(&EngineEvent::Timeout { level: 0 }));
        }
    }

    #[test]
    fn test_storms_only_after_first_cycle() {
        let mut tuning = Tuning::default();
        tuning.storm_spawn_chance = 1.0;
        let levels = vec![level(vec![still(Vec2::new(80.0, 0.0), 80.0, ParticleKind::Primary)])];
        let mut engine = Engine::new(
            Catalog::new(levels).unwrap(),
            tuning,
            Settings::default(),
            Box::new(MemoryStore::new()),
            ScriptedRng::constant(0.0),
        )
        .unwrap();

        park_all(&mut engine);
        step(&mut engine);
        assert!(engine.storms.is_empty());

        // Complete the only level and let it wrap
        place_in_gap(&mut engine, 0, 0);
        let mut wrapped = false;
        for _ in 0..200 {
            let events = step(&mut engine);
            if events.iter().any(|e| matches!(e, EngineEvent::CycleAdvance { .. })) {
                wrapped = true;
                break;
            }
        }
        assert!(wrapped);
        assert!(engine.storms.is_empty());

        park_all(&mut engine);
        let events = step(&mut engine);
        assert!(events.contains(&EngineEvent::StormSpawned { storm: 0 }));
        for _ in 0..10 {
            park_all(&mut engine);
            step(&mut engine);
        }
        assert_eq!(engine.storms.len(), Tuning::default().max_storms);
    }

    /// A storm at its peak radius (half its life spent)
    fn storm_at(id: u32, pos: Vec2) -> Storm {
        Storm {
            id,
            pos,
            radius: 100.0,
            floor_radius: 8.0,
            max_radius: 100.0,
            life: 2.0,
            max_life: 4.0,
            strength: 300.0,
            pulse_phase: 0.0,
        }
    }

    #[test]
    fn test_storm_pushes_only_free_active_particles() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);

        // Captured Secondary sits in slot 2, which a storm covers
        let slot_pos = engine.level.slots[2].pos;
        engine.level.slots[2].capture(3);
        engine.level.particles[2].capture(2, slot_pos);

        let center = Vec2::new(150.0, 150.0);
        engine.storms.storms.push(storm_at(0, center));
        engine.storms.storms.push(storm_at(1, slot_pos));

        engine.level.particles[0].pos = center + Vec2::new(40.0, 0.0);
        engine.level.particles[1].pos = center + Vec2::new(0.0, 40.0);
        engine.level.particles[1].set_refractory(1.0);

        step(&mut engine);
        let free = &engine.level.particles[0];
        assert!(free.vel.x > 0.0);
        assert!(free.pos.x > center.x + 40.0);
        let inactive = &engine.level.particles[1];
        assert_eq!(inactive.vel, Vec2::ZERO);
        assert_eq!(inactive.pos, center + Vec2::new(0.0, 40.0));
        let captured = &engine.level.particles[2];
        assert_eq!(captured.vel, Vec2::ZERO);
        assert_eq!(captured.pos, engine.level.slots[2].pos);
        assert!(engine.level.slots[2].occupied());
    }

    #[test]
    fn test_overlapping_storms_sum_in_tick() {
        let center = Vec2::new(150.0, 150.0);
        let push_with = |storms: u32| {
            let mut engine = engine_for(vec![ordering_level()], Settings::default());
            park_all(&mut engine);
            for id in 0..storms {
                engine.storms.storms.push(storm_at(id, center));
            }
            engine.level.particles[0].pos = center + Vec2::new(40.0, 0.0);
            step(&mut engine);
            engine.level.particles[0].vel.x
        };
        let single = push_with(1);
        let double = push_with(2);
        assert!(single > 0.0);
        assert!((double - 2.0 * single).abs() < 1e-3);
    }

    #[test]
    fn test_restart_input() {
        let mut engine = engine_for(vec![ordering_level()], Settings::default());
        park_all(&mut engine);
        place_in_gap(&mut engine, 0, 0);
        step(&mut engine);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        let events = tick(&mut engine, &restart, SIM_DT);
        assert_eq!(events[0], EngineEvent::Restarted);
        assert_eq!(engine.level.occupied_count(), 0);
        assert_eq!(engine.progression.state().score, 0);
    }
}
