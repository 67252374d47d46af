//! Integration driver for orrery simulations.
//!
//! The engine crate owns everything outside the physics itself: the
//! envelope command protocol, the isolated execution context that runs
//! ticks off the controlling side, the generation-tagged event stream
//! coming back, and the memory-budgeted tick cache that turns that
//! stream into a scrubable timeline.
//!
//! The main entry point is [`Simulation`]; [`Integrator`] is the lower
//! level handle for callers that want to drive the protocol directly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod envelope;
pub mod integrator;
pub mod isolate;
pub mod simulation;

pub(crate) mod tick_thread;

pub use cache::TickCache;
pub use config::{RunConfig, SpawnError, SubmitError};
pub use envelope::{Control, Envelope, Payload};
pub use integrator::{Integrator, IntegratorEvent, ShutdownReport};
pub use isolate::ExecStrategy;
pub use simulation::Simulation;
