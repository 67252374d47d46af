//! Per-tick performance metrics for the step engine.

/// Timing and workload counters for the most recent committed tick.
///
/// Durations are in microseconds. The engine overwrites these after
/// every `execute_tick`; they travel alongside each snapshot so the
/// controlling side can watch throughput without a telemetry layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole tick.
    pub total_us: u64,
    /// Time spent in force accumulation across all substeps.
    pub force_us: u64,
    /// Time spent in collision detection and resolution.
    pub collision_us: u64,
    /// Exact-distance pair checks performed.
    pub pairs_checked: u64,
    /// Merges resolved this tick.
    pub merges: u64,
    /// Live bodies after the tick.
    pub body_count: usize,
}
