//! Block-size independent time keeping.
//!
//! Both trackers work in absolute renderer samples rather than in blocks, so
//! the values they produce do not depend on how the host slices audio into
//! callbacks. Neither allocates.

/// Continuous phase for periodic modulators.
pub mod phase;
/// Restartable cursor producing future event timestamps.
pub mod timestamps;

pub use phase::PhaseAccumulator;
pub use timestamps::EventTimestampTracker;
