//! Orbital Capture entry point
//!
//! Native builds run a headless demo: a scripted pointer sweeps the arena for a
//! fixed span of wall time while every engine event is logged. Browser hosts link
//! the library directly and drive [`Engine::update`] from their own frame loop.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use orbital_capture::consts::{MAX_SUBSTEPS, SIM_DT};
    use orbital_capture::persistence::{BestTimeStore, JsonFileStore, MemoryStore};
    use orbital_capture::sim::{EngineListener, StunCause, dispatch_events};
    use orbital_capture::{Catalog, Engine, EngineError, Settings, TickInput, Tuning, arena_center};

    /// Frame time the demo pretends the host renders at
    const FRAME_DT: f32 = 1.0 / 30.0;
    /// Simulated seconds to run
    const RUN_SECONDS: f32 = 120.0;

    /// Logs every event it hears about
    struct EventLog;

    impl EngineListener for EventLog {
        fn on_capture(&mut self, slot: usize, particle: u32) {
            log::info!("capture: particle {} -> slot {}", particle, slot);
        }
        fn on_stun(&mut self, slot: usize, cause: StunCause, duration: f32) {
            log::info!("stun: slot {} for {:.1}s ({:?})", slot, duration, cause);
        }
        fn on_knockout(&mut self, slot: usize, particle: u32) {
            log::info!("knockout: particle {} left slot {}", particle, slot);
        }
        fn on_storm_spawned(&mut self, storm: u32) {
            log::info!("storm {} spawned", storm);
        }
        fn on_level_complete(&mut self, level: usize, score: u64) {
            log::info!("level {} complete, score {}", level, score);
        }
        fn on_time_warning(&mut self, remaining: f32) {
            log::info!("{:.0}s left", remaining);
        }
        fn on_timeout(&mut self, level: usize) {
            log::info!("level {} timed out", level);
        }
        fn on_cycle_advance(&mut self, cycle: u32, time_limit: f32) {
            log::info!("cycle {} (limit {:.0}s)", cycle, time_limit);
        }
        fn on_new_best_time(&mut self, seconds: f32) {
            log::info!("new best pass: {:.2}s", seconds);
        }
    }

    /// Pointer tracing a slow rosette around the arena center
    fn pointer_at(t: f32) -> Vec2 {
        let r = 60.0 + 120.0 * (0.5 + 0.5 * (t * 0.35).sin());
        arena_center() + Vec2::new(r * (t * 0.9).cos(), r * (t * 0.9).sin())
    }

    pub fn run() -> Result<(), EngineError> {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0x0C0F_FEE5);
        let store: Box<dyn BestTimeStore> = match args.next() {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };

        let mut engine = Engine::with_seed(
            Catalog::builtin(),
            Tuning::default(),
            Settings::default(),
            store,
            seed,
        )?;
        log::info!("Seed {}, first level {}", seed, engine.current_level().name);

        let mut listener = EventLog;
        let mut accumulator = 0.0;
        let mut elapsed = 0.0;
        while elapsed < RUN_SECONDS {
            accumulator += FRAME_DT;
            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = TickInput::pointer_at(pointer_at(elapsed));
                let events = engine.update(SIM_DT, &input);
                dispatch_events(&events, &mut listener);
                accumulator -= SIM_DT;
                elapsed += SIM_DT;
                substeps += 1;
            }
        }

        let state = engine.query_state();
        log::info!(
            "Done: level {} ({}), cycle {}, score {}, {} levels completed",
            state.level_index,
            state.level.symbol,
            state.session.cycle_count,
            state.session.score,
            state.session.levels_completed
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Orbital Capture (headless) starting...");
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser hosts drive the library directly
}
