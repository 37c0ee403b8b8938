//! The render-context side of the synthesizer.
//!
//! [`control::SynthEngine`] runs once per block, [`scheduler`] encodes the
//! events it computes and [`telemetry`] carries throttled snapshots back out.

pub mod control;
pub mod scheduler;
pub mod telemetry;

pub use control::{Controls, EngineStatus, SynthEngine};
pub use scheduler::SineEventScheduler;
pub use telemetry::{EngineStats, TelemetrySink, TelemetrySnapshot};
