//! Core types for the Orrery N-body simulation workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the 2D
//! vector type, geometry helpers, identifiers, physical constants,
//! physics configuration, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod geom;
pub mod id;
pub mod vec2;

pub use config::{BodySpec, PhysicsConfig};
pub use error::{CacheError, ConfigError, ProtocolError, StepError};
pub use id::{BodyId, RunGeneration, TickId};
pub use vec2::Vec2;
