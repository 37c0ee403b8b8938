pub mod config;
pub mod engine; // Per-block control loop, event encoding, telemetry
pub mod error;
pub mod modulation; // Modulator registry and evaluators
pub mod render; // Renderer contract + reference sine bank
pub mod synth; // Control messages into the render context
pub mod timing; // Phase and timestamp trackers

pub use config::EngineConfig;
pub use engine::{control::SynthEngine, scheduler::SineEventScheduler};
pub use error::{Error, Result};

/// Number of harmonic partials driven by the engine.
pub const NUM_PARTIALS: usize = 32;
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Spacing between scheduled events of one stream, in samples.
pub const DEFAULT_EVENT_INTERVAL: u64 = 128;
/// Hard cap on events written per partial per stream in one block.
pub const MAX_EVENTS_PER_PARTIAL: usize = 8;
/// Distance between the two points of an override ramp, in samples.
pub const OVERRIDE_RAMP_SAMPLES: u64 = 8;
/// Fixed divisor applied to the combined modulator product.
pub const HEADROOM: f64 = 16.0;
/// Publish a telemetry snapshot every N blocks.
pub const TELEMETRY_INTERVAL: u32 = 8;
