use std::{collections::VecDeque, f64::consts::TAU};

use super::{segments, Segment, SineId, SineRenderer};
use crate::error::{Error, Result};

/*
Reference Sine Bank
===================

A plain additive renderer that honours the event contract. Each sine has
two breakpoint streams, amplitude and frequency. Between breakpoints the
value moves in a straight line; after the last one it holds.

    value
      |        B
      |       /\
      |  A___/  \____C          A, B, C are staged events
      |
      +---------------------> samples

Staging rules, per stream:

  regular   Events must land strictly after the last staged event.
            Anything else is rejected and the stream is left untouched.

  override  Every staged event at or after the first new sample is dropped,
            then the new events are appended. The ramp from whatever value
            is live at that moment to the first new event stays continuous.

Queues are allocated when the sines are created and never grow: a batch
that would overflow one is refused.
*/

/// Staged events per stream.
pub const STAGING_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    sample: u64,
    value: f64,
}

#[derive(Debug, Clone)]
struct Stream {
    anchor: Breakpoint,
    pending: VecDeque<Breakpoint>,
    last_staged: Option<u64>,
}

impl Stream {
    fn new(start: u64, value: f64) -> Self {
        Self {
            anchor: Breakpoint { sample: start, value },
            pending: VecDeque::with_capacity(STAGING_CAPACITY),
            last_staged: None,
        }
    }

    fn stage(&mut self, sine: SineId, segment: &Segment) -> Result<()> {
        let Some(first) = segment.first_sample() else {
            return Ok(());
        };

        let mut previous = if segment.override_pending {
            None
        } else {
            self.last_staged
        };
        for (sample, _) in segment.events() {
            if previous.map_or(false, |p| sample <= p) {
                return Err(Error::NonMonotonic { sine, sample });
            }
            previous = Some(sample);
        }

        let kept = if segment.override_pending {
            self.pending.iter().take_while(|bp| bp.sample < first).count()
        } else {
            self.pending.len()
        };
        if kept + segment.pairs.len() / 2 > STAGING_CAPACITY {
            return Err(Error::StagingFull { sine });
        }

        self.pending.truncate(kept);
        for (sample, value) in segment.events() {
            self.pending.push_back(Breakpoint { sample, value });
        }
        self.last_staged = previous;
        Ok(())
    }

    /// Value at sample `t`, consuming breakpoints that have fallen due.
    fn value_at(&mut self, t: u64) -> f64 {
        while let Some(&front) = self.pending.front() {
            if front.sample > t {
                break;
            }
            self.anchor = front;
            self.pending.pop_front();
        }

        match self.pending.front() {
            Some(next) => {
                let span = (next.sample - self.anchor.sample) as f64;
                let progress = t.saturating_sub(self.anchor.sample) as f64 / span;
                self.anchor.value + (next.value - self.anchor.value) * progress
            }
            None => self.anchor.value,
        }
    }
}

#[derive(Debug, Clone)]
struct Sine {
    phase: f64,
    amplitude: Stream,
    frequency: Stream,
}

fn amplitude_stream(sine: &mut Sine) -> &mut Stream {
    &mut sine.amplitude
}

fn frequency_stream(sine: &mut Sine) -> &mut Stream {
    &mut sine.frequency
}

/// Reference [`SineRenderer`]: linear breakpoint interpolation, one phase
/// per sine, mono output.
pub struct SineBank {
    sample_rate: Option<f64>,
    position: u64,
    sines: Vec<Option<Sine>>,
}

impl SineBank {
    pub fn new() -> Self {
        Self {
            sample_rate: None,
            position: 0,
            sines: Vec::new(),
        }
    }

    /// Events staged but not yet reached on a sine's amplitude stream, as
    /// `(sample, value)` pairs. Allocates; meant for tests and tools.
    pub fn staged_amplitude(&self, id: SineId) -> Option<Vec<(u64, f64)>> {
        let sine = self.sines.get(id as usize)?.as_ref()?;
        Some(staged_pairs(&sine.amplitude))
    }

    pub fn staged_frequency(&self, id: SineId) -> Option<Vec<(u64, f64)>> {
        let sine = self.sines.get(id as usize)?.as_ref()?;
        Some(staged_pairs(&sine.frequency))
    }

    fn stage(&mut self, events: &[f64], pick: fn(&mut Sine) -> &mut Stream) -> Result<()> {
        if self.sample_rate.is_none() {
            return Err(Error::NotStarted);
        }

        // Refuse malformed batches before touching any stream
        for segment in segments(events) {
            segment?;
        }

        let mut outcome = Ok(());
        for segment in segments(events).flatten() {
            let staged = match self.sines.get_mut(segment.sine as usize) {
                Some(Some(sine)) => pick(sine).stage(segment.sine, &segment),
                _ => Err(Error::UnknownSine { sine: segment.sine }),
            };
            if outcome.is_ok() {
                outcome = staged;
            }
        }
        outcome
    }
}

fn staged_pairs(stream: &Stream) -> Vec<(u64, f64)> {
    stream.pending.iter().map(|bp| (bp.sample, bp.value)).collect()
}

impl Default for SineBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SineRenderer for SineBank {
    fn init(&mut self, sample_rate: f64) -> Result<()> {
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            return Err(Error::RendererInit);
        }
        self.sample_rate = Some(sample_rate);
        Ok(())
    }

    fn add_sines(&mut self, initial_phases: &[f64]) -> Result<Vec<SineId>> {
        if self.sample_rate.is_none() {
            return Err(Error::NotStarted);
        }
        let mut ids = Vec::with_capacity(initial_phases.len());
        for &phase in initial_phases {
            ids.push(self.sines.len() as SineId);
            self.sines.push(Some(Sine {
                phase: phase.rem_euclid(1.0),
                amplitude: Stream::new(self.position, 0.0),
                frequency: Stream::new(self.position, 0.0),
            }));
        }
        Ok(ids)
    }

    fn add_amplitude_events(&mut self, events: &[f64]) -> Result<()> {
        self.stage(events, amplitude_stream)
    }

    fn add_frequency_events(&mut self, events: &[f64]) -> Result<()> {
        self.stage(events, frequency_stream)
    }

    fn render(&mut self, out: &mut [f32]) -> Result<()> {
        let sample_rate = self.sample_rate.ok_or(Error::NotStarted)?;

        for (i, frame) in out.iter_mut().enumerate() {
            let t = self.position + i as u64;
            let mut acc = 0.0;
            for sine in self.sines.iter_mut().flatten() {
                let amplitude = sine.amplitude.value_at(t);
                let frequency = sine.frequency.value_at(t);
                acc += amplitude * (TAU * sine.phase).sin();
                sine.phase = (sine.phase + frequency / sample_rate).rem_euclid(1.0);
            }
            *frame = acc as f32;
        }

        self.position += out.len() as u64;
        Ok(())
    }

    fn current_sample_position(&self) -> u64 {
        self.position
    }

    fn remove_sine(&mut self, id: SineId) -> Result<()> {
        match self.sines.get_mut(id as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(Error::UnknownSine { sine: id }),
        }
    }

    /// Drop every sine. The sample position keeps counting.
    fn reset(&mut self) {
        self.sines.clear();
    }

    fn num_sines(&self) -> usize {
        self.sines.iter().flatten().count()
    }
}
