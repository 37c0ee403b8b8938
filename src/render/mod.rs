//! Contract with the sample-rendering engine.
//!
//! The control loop never produces audio itself. It feeds encoded event
//! batches (see `engine::scheduler`) to a [`SineRenderer`] and asks it to
//! fill one block at a time.

pub mod bank;

pub use bank::SineBank;

use crate::error::Result;

/// Identifier the renderer hands out for each sine.
pub type SineId = u32;

/// The operations the control loop consumes from a renderer.
///
/// `init` and `add_sines` run once when synthesis starts and may allocate.
/// Everything else is called from the render context and must not.
pub trait SineRenderer: Send {
    fn init(&mut self, sample_rate: f64) -> Result<()>;

    /// Create one sine per initial phase, all at once. Returns their ids in
    /// the same order.
    fn add_sines(&mut self, initial_phases: &[f64]) -> Result<Vec<SineId>>;

    /// Stage an encoded amplitude batch. Non-override events must land after
    /// the last staged event of their sine.
    fn add_amplitude_events(&mut self, events: &[f64]) -> Result<()>;

    /// Stage an encoded frequency batch. Same rules as amplitude.
    fn add_frequency_events(&mut self, events: &[f64]) -> Result<()>;

    /// Fill exactly one block, consuming events that fall due.
    fn render(&mut self, out: &mut [f32]) -> Result<()>;

    /// Absolute position of the next sample `render` will produce.
    fn current_sample_position(&self) -> u64;

    fn remove_sine(&mut self, id: SineId) -> Result<()>;

    fn reset(&mut self);

    fn num_sines(&self) -> usize;
}

impl SineRenderer for Box<dyn SineRenderer> {
    fn init(&mut self, sample_rate: f64) -> Result<()> {
        (**self).init(sample_rate)
    }

    fn add_sines(&mut self, initial_phases: &[f64]) -> Result<Vec<SineId>> {
        (**self).add_sines(initial_phases)
    }

    fn add_amplitude_events(&mut self, events: &[f64]) -> Result<()> {
        (**self).add_amplitude_events(events)
    }

    fn add_frequency_events(&mut self, events: &[f64]) -> Result<()> {
        (**self).add_frequency_events(events)
    }

    fn render(&mut self, out: &mut [f32]) -> Result<()> {
        (**self).render(out)
    }

    fn current_sample_position(&self) -> u64 {
        (**self).current_sample_position()
    }

    fn remove_sine(&mut self, id: SineId) -> Result<()> {
        (**self).remove_sine(id)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn num_sines(&self) -> usize {
        (**self).num_sines()
    }
}

/// One decoded segment of an event batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    pub sine: SineId,
    pub override_pending: bool,
    /// `(sample, value)` pairs, flattened
    pub pairs: &'a [f64],
}

impl Segment<'_> {
    pub fn events(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.pairs.chunks_exact(2).map(|pair| (pair[0] as u64, pair[1]))
    }

    pub fn first_sample(&self) -> Option<u64> {
        self.pairs.first().map(|&s| s as u64)
    }
}

/// Walk the segments of an encoded batch. Yields an error for a truncated
/// or malformed segment and stops.
pub fn segments(events: &[f64]) -> Segments<'_> {
    Segments { rest: events }
}

pub struct Segments<'a> {
    rest: &'a [f64],
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let sine = self.rest[0] as SineId;
        if self.rest.len() < 3 {
            self.rest = &[];
            return Some(Err(crate::Error::EventsRejected { sine }));
        }
        let count = self.rest[1];
        let available = (self.rest.len() - 3) / 2;
        if !count.is_finite() || count < 0.0 || count.fract() != 0.0 || count > available as f64 {
            self.rest = &[];
            return Some(Err(crate::Error::EventsRejected { sine }));
        }
        let end = 3 + count as usize * 2;
        let segment = Segment {
            sine,
            override_pending: self.rest[2] != 0.0,
            pairs: &self.rest[3..end],
        };
        self.rest = &self.rest[end..];
        Some(Ok(segment))
    }
}
