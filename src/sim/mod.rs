//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only
//! - Stable iteration order (slots in definition order, particles by ID)
//! - No rendering, audio or platform dependencies

pub mod engine;
pub mod events;
pub mod gate;
pub mod hazard;
pub mod particle;
pub mod rng;
pub mod rules;
pub mod session;
pub mod slot;
pub mod state;
pub mod tick;

pub use engine::{Engine, EngineSnapshot};
pub use events::{EngineEvent, EngineListener, dispatch_events};
pub use gate::{GateVerdict, StunCause};
pub use hazard::{Storm, StormField};
pub use particle::Particle;
pub use rng::{RandomSource, ScriptedRng, seeded};
pub use rules::RuleViolation;
pub use session::{Progression, SessionPhase, SessionState, time_limit_for};
pub use slot::{HitOutcome, Slot, SlotPhase, stun_duration};
pub use state::{LevelState, ParticleKind};
pub use tick::{TickInput, tick};
