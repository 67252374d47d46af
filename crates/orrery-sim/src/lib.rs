//! The physics step engine: force accumulation, semi-implicit
//! integration, swept-bounds collision detection, barycenter merging,
//! and real/pseudo classification.
//!
//! [`StepEngine`] owns all body state for one run. It is designed to be
//! moved into an isolated execution context (a dedicated thread, or an
//! inline driver on single-threaded hosts) and to hand out per-tick
//! [`TickSnapshot`]s as the only view of its state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod bounds;
pub mod metrics;
pub mod partition;
pub mod snapshot;
pub mod step;

pub use body::{Body, BodyTable};
pub use bounds::Bounds;
pub use metrics::StepMetrics;
pub use partition::Partition;
pub use snapshot::{BodyView, TickSnapshot};
pub use step::StepEngine;
