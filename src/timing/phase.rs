use std::f64::consts::TAU;

/*
Phase Accumulation
==================

Periodic modulators (LFOs, sweeping combs, pulse-width wobble) need a phase
that moves at a fixed rate in Hz no matter how large the audio blocks are.

Vocabulary
----------

  phase         Position inside one cycle, normalized to [0.0, 1.0).
                0.25 is a quarter of the way round, sin(2π·0.25) = 1.

  rate          Cycles per second (Hz). A 0.5 Hz LFO takes two seconds to
                travel from phase 0.0 back to phase 0.0.

  sample delta  Samples elapsed since the previous advance. The renderer's
                sample counter is the clock, not the number of callbacks.


Why Samples, Not Blocks
-----------------------

A naive modulator adds `rate * block_duration` to its phase every callback.
That drifts as soon as the host changes block size, skips a callback, or
calls us twice for one hardware period. Instead we remember the absolute
sample position of the last advance and move by exactly what elapsed:

    delta = current_sample - last_sample
    phase = (phase + delta / sample_rate * rate) mod 1

Two calls at the same position advance nothing. A late callback catches up
by however many samples it missed.


Lookahead Without Commitment
----------------------------

The scheduler writes events up to one interval past the end of the current
block. Those events need modulator values from the future, but the phase must
only ever move when the clock moves. `sin_at` answers "what will the value be
`offset` samples from now?" from a copy of the phase and leaves the
accumulator untouched:

    sin_at(offset) = sin(2π · ((phase + offset / sample_rate * rate + phase_offset) mod 1))

You can call it any number of times between advances.
*/

/// Continuous phase tracker immune to block-size jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
    rate: f64,
    last_sample: u64,
}

impl PhaseAccumulator {
    pub fn new(rate: f64) -> Self {
        Self {
            phase: 0.0,
            rate,
            last_sample: 0,
        }
    }

    /// Move the phase forward to `current_sample`.
    ///
    /// Call once per block with a non-decreasing sample position. Returns the
    /// new phase.
    pub fn advance(&mut self, current_sample: u64, sample_rate: f64) -> f64 {
        let delta = current_sample.saturating_sub(self.last_sample);
        if delta > 0 {
            self.phase = wrap(self.phase + delta as f64 / sample_rate * self.rate);
        }
        self.last_sample = current_sample;
        self.phase
    }

    /// Sine of the phase `sample_offset` samples ahead, shifted by
    /// `phase_offset` cycles. Pure: the accumulator is not modified.
    #[inline]
    pub fn sin_at(&self, sample_offset: f64, sample_rate: f64, phase_offset: f64) -> f64 {
        (TAU * self.phase_at(sample_offset, sample_rate, phase_offset)).sin()
    }

    /// Normalized phase `sample_offset` samples ahead. Pure.
    #[inline]
    pub fn phase_at(&self, sample_offset: f64, sample_rate: f64, phase_offset: f64) -> f64 {
        wrap(self.phase + sample_offset / sample_rate * self.rate + phase_offset)
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset_phase(&mut self, phase: f64) {
        self.phase = wrap(phase);
    }
}

impl Default for PhaseAccumulator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Fold any value into [0.0, 1.0).
#[inline]
fn wrap(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48_000.0;

    #[test]
    fn test_advance_uses_sample_delta() {
        let mut acc = PhaseAccumulator::new(1.0);
        acc.advance(12_000, SR);
        assert!(
            (acc.phase() - 0.25).abs() < 1e-12,
            "expected quarter cycle, got {}",
            acc.phase()
        );
    }

    #[test]
    fn test_advance_is_independent_of_block_slicing() {
        let mut coarse = PhaseAccumulator::new(3.7);
        let mut fine = PhaseAccumulator::new(3.7);

        coarse.advance(4096, SR);
        for pos in (0..=4096).step_by(64) {
            fine.advance(pos, SR);
        }

        assert!(
            (coarse.phase() - fine.phase()).abs() < 1e-9,
            "coarse {} vs fine {}",
            coarse.phase(),
            fine.phase()
        );
    }

    #[test]
    fn test_advance_twice_at_same_position_is_noop() {
        let mut acc = PhaseAccumulator::new(2.0);
        let first = acc.advance(1000, SR);
        let second = acc.advance(1000, SR);
        assert_eq!(first, second);
    }

    #[test]
    fn test_phase_wraps() {
        let mut acc = PhaseAccumulator::new(1.0);
        acc.advance(60_000, SR); // 1.25 cycles
        assert!((acc.phase() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_sin_at_is_idempotent_and_non_mutating() {
        let mut acc = PhaseAccumulator::new(5.0);
        acc.advance(777, SR);
        let before = acc;

        let a = acc.sin_at(128.0, SR, 0.1);
        let b = acc.sin_at(128.0, SR, 0.1);
        assert_eq!(a, b, "sin_at must return identical results");
        assert_eq!(acc, before, "sin_at must not mutate state");
    }

    #[test]
    fn test_advance_unaffected_by_lookahead_queries() {
        let mut queried = PhaseAccumulator::new(0.8);
        let mut plain = PhaseAccumulator::new(0.8);

        for block in 1..50u64 {
            for offset in 0..4 {
                queried.sin_at(offset as f64 * 128.0, SR, 0.0);
            }
            queried.advance(block * 256, SR);
            plain.advance(block * 256, SR);
        }

        assert_eq!(queried.phase(), plain.phase());
    }

    #[test]
    fn test_sin_at_matches_future_advance() {
        let mut acc = PhaseAccumulator::new(2.5);
        acc.advance(1000, SR);
        let predicted = acc.sin_at(500.0, SR, 0.0);
        acc.advance(1500, SR);
        let actual = acc.sin_at(0.0, SR, 0.0);
        assert!((predicted - actual).abs() < 1e-9);
    }

    #[test]
    fn test_reset_phase_normalizes() {
        let mut acc = PhaseAccumulator::default();
        acc.reset_phase(2.75);
        assert!((acc.phase() - 0.75).abs() < 1e-12);
        acc.reset_phase(-0.25);
        assert!((acc.phase() - 0.75).abs() < 1e-12);
    }
}
