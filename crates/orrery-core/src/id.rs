//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a body within one simulation run.
///
/// A `BodyId` is an index into the body table plus the generation of the
/// slot at assignment time. When a body is destroyed by a merge its slot
/// generation is bumped, so any id still held elsewhere (a link, a
/// caller-side registry) no longer resolves. Stale references read as
/// "no body" instead of dereferencing a destroyed slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId {
    /// Slot index in the body table.
    pub index: u32,
    /// Slot generation at the time this id was handed out.
    pub generation: u32,
}

impl BodyId {
    /// Id of the body first created in slot `index`.
    pub const fn initial(index: u32) -> Self {
        Self {
            index,
            generation: 0,
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the step engine commits one tick. Tick 0 is
/// the starting state, captured before any integration has run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one isolated-context lifetime within an integrator.
///
/// Bumped every time the body set is replaced and a fresh context is
/// spawned. Every message produced inside a context is tagged with the
/// generation it belongs to, so in-flight results from a terminated
/// context are discarded instead of corrupting the new run's history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunGeneration(pub u64);

impl RunGeneration {
    /// The next generation.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
