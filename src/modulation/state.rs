//! Small state machines for modulators that evolve between blocks.
//!
//! Each machine owns its state and moves it forward with `advance(dt, ..)`,
//! called once per block. Evaluation afterwards is a pure read.

use rand::Rng;

use crate::NUM_PARTIALS;

/// Per-partial values in [-1, 1], each re-rolled at random moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalk {
    values: [f64; NUM_PARTIALS],
}

impl RandomWalk {
    pub fn new() -> Self {
        Self {
            values: [0.0; NUM_PARTIALS],
        }
    }

    /// Each partial independently re-rolls with probability
    /// `change_rate * dt` (changes per second times block duration).
    pub fn advance<R: Rng>(&mut self, dt: f64, change_rate: f64, rng: &mut R) {
        let probability = (change_rate * dt).clamp(0.0, 1.0);
        for value in self.values.iter_mut() {
            if rng.gen::<f64>() < probability {
                *value = rng.gen_range(-1.0..=1.0);
            }
        }
    }

    pub fn value(&self, partial: usize) -> f64 {
        self.values[partial]
    }
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase of the "barber pole" stripes sweeping across the harmonics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StripeGate {
    phase: f64,
}

impl StripeGate {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Stripes travel `speed` harmonics per second; in stripe coordinates
    /// that is `speed / |density|` per second.
    pub fn advance(&mut self, dt: f64, speed: f64, density: f64) {
        let density = density.abs().max(1e-6);
        self.phase = (self.phase + speed / density * dt).rem_euclid(1.0);
    }

    /// Stripe coordinate of harmonic `n`.
    pub fn position(&self, n: f64, density: f64) -> f64 {
        let density = if density.abs() < 1e-6 { 1e-6 } else { density };
        n / density + self.phase
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }
}

/*
Falling Harmonics
=================

One lit harmonic (the migrator) starts at the top of the bank and drifts
down one step at a time, each block with probability p. Harmonics that have
already fallen pile up at the bottom:

    index:   0 1 2 3 ... 28 29 30 31
    block a: # # . . ...  .  #  .  .     landed = 2, migrator = 29
    block b: # # # . ...  .  .  .  #     migrator reached the pile, landed = 3

When the migrator reaches the top of the pile it lands, the pile grows by
one, and a new migrator appears at index 31. Once all 32 have landed the
pile clears and the cycle starts over.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingHarmonics {
    migrator: usize,
    landed: usize,
}

impl FallingHarmonics {
    const TOP: usize = NUM_PARTIALS - 1;

    pub fn new() -> Self {
        Self {
            migrator: Self::TOP,
            landed: 0,
        }
    }

    pub fn advance<R: Rng>(&mut self, probability: f64, rng: &mut R) {
        if rng.gen::<f64>() >= probability {
            return;
        }
        if self.migrator > self.landed {
            self.migrator -= 1;
        }
        if self.migrator == self.landed {
            self.landed += 1;
            if self.landed >= NUM_PARTIALS {
                self.landed = 0;
            }
            self.migrator = Self::TOP;
        }
    }

    /// 1.0 for the migrator and every landed harmonic, otherwise 0.0.
    pub fn gate(&self, partial: usize) -> f64 {
        if partial < self.landed || partial == self.migrator {
            1.0
        } else {
            0.0
        }
    }

    pub fn migrator(&self) -> usize {
        self.migrator
    }

    pub fn landed(&self) -> usize {
        self.landed
    }
}

impl Default for FallingHarmonics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_random_walk_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut walk = RandomWalk::new();
        for _ in 0..1000 {
            walk.advance(128.0 / 48_000.0, 40.0, &mut rng);
        }
        for p in 0..NUM_PARTIALS {
            let v = walk.value(p);
            assert!((-1.0..=1.0).contains(&v), "walk value {} out of range", v);
        }
    }

    #[test]
    fn test_random_walk_zero_rate_never_moves() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut walk = RandomWalk::new();
        for _ in 0..500 {
            walk.advance(0.01, 0.0, &mut rng);
        }
        assert_eq!(walk, RandomWalk::new());
    }

    #[test]
    fn test_random_walk_certain_change_rolls_everything() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut walk = RandomWalk::new();
        walk.advance(1.0, 10.0, &mut rng);
        let moved = (0..NUM_PARTIALS).filter(|&p| walk.value(p) != 0.0).count();
        assert_eq!(moved, NUM_PARTIALS);
    }

    #[test]
    fn test_stripe_phase_advances_by_speed_over_density() {
        let mut stripes = StripeGate::new();
        stripes.advance(0.5, 1.0, 4.0);
        assert!((stripes.phase() - 0.125).abs() < 1e-12);
        stripes.advance(0.5, -1.0, -4.0);
        assert!(stripes.phase().abs() < 1e-12);
    }

    #[test]
    fn test_falling_harmonic_descends_and_lands() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut falling = FallingHarmonics::new();
        assert_eq!(falling.migrator(), 31);

        // Probability 1: one step per block, lands after 31 steps
        for step in 1..31 {
            falling.advance(1.0, &mut rng);
            assert_eq!(falling.migrator(), 31 - step);
        }
        falling.advance(1.0, &mut rng);
        assert_eq!(falling.landed(), 1);
        assert_eq!(falling.migrator(), 31);
        assert_eq!(falling.gate(0), 1.0);
        assert_eq!(falling.gate(1), 0.0);
        assert_eq!(falling.gate(31), 1.0);
    }

    #[test]
    fn test_falling_harmonics_reset_when_full() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut falling = FallingHarmonics::new();
        let mut blocks = 0;
        while falling.landed() < NUM_PARTIALS - 1 {
            falling.advance(1.0, &mut rng);
            blocks += 1;
            assert!(blocks < 10_000, "pile never filled");
        }
        // The last migrator lands on top of a pile of 31 immediately
        falling.advance(1.0, &mut rng);
        assert_eq!(falling.landed(), 0, "pile should clear once every harmonic landed");
        assert_eq!(falling.migrator(), 31);
    }

    #[test]
    fn test_falling_zero_probability_is_frozen() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut falling = FallingHarmonics::new();
        for _ in 0..100 {
            falling.advance(0.0, &mut rng);
        }
        assert_eq!(falling, FallingHarmonics::new());
    }
}
