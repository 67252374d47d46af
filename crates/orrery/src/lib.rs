//! Orrery: a gravitational n-body toy simulator with a scrubable,
//! memory-budgeted timeline.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the orrery sub-crates. For most users, adding `orrery` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use orrery::prelude::*;
//!
//! // Inline execution ticks once per pump, which keeps this example
//! // deterministic. The default strategy runs on its own thread.
//! let config = RunConfig {
//!     strategy: ExecStrategy::Inline,
//!     tick_rate_hz: None,
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//!
//! let ids = sim
//!     .create_bodies(vec![
//!         BodySpec::new(10_000.0, Vec2::new(0.0, 0.0), Vec2::ZERO),
//!         BodySpec::new(100.0, Vec2::new(500.0, 0.0), Vec2::new(0.0, 2.0)),
//!     ])
//!     .unwrap();
//!
//! sim.start().unwrap();
//! for _ in 0..10 {
//!     sim.pump();
//! }
//!
//! // Scrub anywhere in the cached range and read body state.
//! sim.set_tick(TickId(5));
//! let state = sim.body_state(ids[1]).unwrap().unwrap();
//! assert!(state.pos().is_finite());
//! assert_eq!(sim.max_tick(), Some(TickId(10)));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `orrery-core` | Vectors, ids, constants, configs, error types |
//! | [`sim`] | `orrery-sim` | The step engine, bodies, bounds, snapshots |
//! | [`engine`] | `orrery-engine` | Integrator, envelope protocol, tick cache |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, constants, and errors (`orrery-core`).
///
/// Contains [`types::Vec2`], body and tick ids, the physics constants,
/// and the validated configuration types.
pub use orrery_core as types;

/// Physics internals (`orrery-sim`).
///
/// The [`sim::StepEngine`] and its supporting pieces: bodies, swept
/// bounds, spatial partitions, and [`sim::TickSnapshot`].
pub use orrery_sim as sim;

/// Integration driver (`orrery-engine`).
///
/// [`engine::Simulation`] for cached-timeline playback,
/// [`engine::Integrator`] for driving the envelope protocol directly.
pub use orrery_engine as engine;

/// Common imports for typical orrery usage.
///
/// ```rust
/// use orrery::prelude::*;
/// ```
pub mod prelude {
    pub use orrery_core::{
        BodyId, BodySpec, CacheError, ConfigError, PhysicsConfig, ProtocolError, RunGeneration,
        StepError, TickId, Vec2,
    };
    pub use orrery_engine::{
        Control, Envelope, ExecStrategy, Integrator, IntegratorEvent, Payload, RunConfig,
        ShutdownReport, Simulation, SpawnError, SubmitError, TickCache,
    };
    pub use orrery_sim::{BodyView, StepEngine, StepMetrics, TickSnapshot};
}
