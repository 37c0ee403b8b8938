//! Engine configuration.
//!
//! Everything here is fixed for the lifetime of a [`crate::SynthEngine`]:
//! buffer capacities are derived from it at construction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    DEFAULT_EVENT_INTERVAL, HEADROOM, MAX_BLOCK_SIZE, MAX_EVENTS_PER_PARTIAL,
    OVERRIDE_RAMP_SAMPLES, TELEMETRY_INTERVAL,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Audio sample rate in Hz
    pub sample_rate: f64,
    /// Frames per block handed to the renderer
    pub block_size: usize,
    /// Fundamental of the first partial before pitch ratio, in Hz
    pub base_frequency: f64,
    /// Samples between scheduled events of one stream
    pub event_interval: u64,
    /// How far past the end of each block events are generated
    pub lookahead: u64,
    pub max_events_per_partial: usize,
    /// Length of an override ramp in samples
    pub override_ramp: u64,
    /// Divisor applied to the combined modulator product
    pub headroom: f64,
    /// Publish telemetry every N blocks
    pub telemetry_interval: u32,
    /// Seed for stochastic modulators
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 128,
            base_frequency: 110.0,
            event_interval: DEFAULT_EVENT_INTERVAL,
            lookahead: DEFAULT_EVENT_INTERVAL,
            max_events_per_partial: MAX_EVENTS_PER_PARTIAL,
            override_ramp: OVERRIDE_RAMP_SAMPLES,
            headroom: HEADROOM,
            telemetry_interval: TELEMETRY_INTERVAL,
            seed: 0x5EED,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let checks: [(bool, &'static str); 9] = [
            (self.sample_rate > 0.0 && self.sample_rate.is_finite(), "sample_rate"),
            (self.block_size > 0 && self.block_size <= MAX_BLOCK_SIZE, "block_size"),
            (self.base_frequency > 0.0 && self.base_frequency.is_finite(), "base_frequency"),
            (self.event_interval > 0, "event_interval"),
            (self.max_events_per_partial >= 4, "max_events_per_partial"),
            (self.override_ramp > 0 && self.override_ramp < self.event_interval, "override_ramp"),
            (self.headroom > 0.0, "headroom"),
            (self.telemetry_interval > 0, "telemetry_interval"),
            // A full block of grid events plus an override pair must fit the cap
            (
                self.event_interval > 0
                    && self.grid_events_per_block() + 2 <= self.max_events_per_partial,
                "max_events_per_partial",
            ),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some(&(_, field)) => Err(Error::InvalidConfig { field }),
            None => Ok(()),
        }
    }

    /// Upper bound on regular grid events one stream needs in one block:
    /// everything from the block start through block end plus lookahead.
    pub fn grid_events_per_block(&self) -> usize {
        let span = self.block_size as u64 + self.lookahead;
        (span / self.event_interval.max(1)) as usize + 1
    }

    /// Seconds covered by one block.
    pub fn block_duration(&self) -> f64 {
        self.block_size as f64 / self.sample_rate
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }
}
