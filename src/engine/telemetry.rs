//! Throttled, best-effort snapshots out of the render context.
//!
//! Snapshots are plain `Copy` data: building and pushing one never
//! allocates, and a full channel simply drops it.

#[cfg(feature = "rtrb")]
use rtrb::Producer;

use crate::{modulation::ModulatorKind, NUM_PARTIALS};

/// Counters for the failure modes the render context absorbs silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Blocks processed while running
    pub blocks: u64,
    /// Event batches the renderer refused
    pub dropped_batches: u64,
    /// Blocks zero-filled after a render failure
    pub silent_blocks: u64,
    /// Events dropped by the per-partial cap
    pub capped_events: u64,
    /// Blocks in which an override ramp was injected
    pub overrides: u64,
}

/// Latest per-partial values, one array per visualization category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub sample_position: u64,
    /// Display value of every modulator, indexed by `ModulatorKind::index`
    pub modulators: [[f32; NUM_PARTIALS]; ModulatorKind::COUNT],
    /// First scheduled amplitude of the block, after headroom and gate
    pub amplitude: [f32; NUM_PARTIALS],
    /// Current frequency of each partial in Hz
    pub frequency: [f32; NUM_PARTIALS],
    pub gate: bool,
    pub pitch_ratio: f32,
    pub stats: EngineStats,
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self {
            sample_position: 0,
            modulators: [[0.0; NUM_PARTIALS]; ModulatorKind::COUNT],
            amplitude: [0.0; NUM_PARTIALS],
            frequency: [0.0; NUM_PARTIALS],
            gate: false,
            pitch_ratio: 1.0,
            stats: EngineStats::default(),
        }
    }

    pub fn modulator(&self, kind: ModulatorKind) -> &[f32; NUM_PARTIALS] {
        &self.modulators[kind.index()]
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for snapshots. Must never block.
pub trait TelemetrySink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot);
}

/// Discards everything.
impl TelemetrySink for () {
    fn publish(&mut self, _snapshot: &TelemetrySnapshot) {}
}

#[cfg(feature = "rtrb")]
impl TelemetrySink for Producer<TelemetrySnapshot> {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) {
        // Full means the UI is behind; it will catch the next one
        let _ = self.push(*snapshot);
    }
}
