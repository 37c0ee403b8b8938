use std::f64::consts::TAU;

use rand::{rngs::SmallRng, SeedableRng};

use super::{
    shapes,
    state::{FallingHarmonics, RandomWalk, StripeGate},
    ModulatorKind, MAX_PARAMS,
};
use crate::{timing::PhaseAccumulator, NUM_PARTIALS};

/// Where in time (and pitch) a modulator is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalCtx {
    /// Samples past the start of the current block
    pub sample_offset: f64,
    pub sample_rate: f64,
    /// Fundamental in Hz, pitch ratio included
    pub fundamental: f64,
}

impl EvalCtx {
    pub fn new(sample_offset: f64, sample_rate: f64, fundamental: f64) -> Self {
        Self {
            sample_offset,
            sample_rate,
            fundamental,
        }
    }
}

/// Parameters, enable flag and phase of one modulator.
#[derive(Debug, Clone, Copy)]
struct ModulatorSlot {
    enabled: bool,
    values: [f64; MAX_PARAMS],
    phase: PhaseAccumulator,
}

impl ModulatorSlot {
    fn new(kind: ModulatorKind) -> Self {
        let mut values = [0.0; MAX_PARAMS];
        for (value, spec) in values.iter_mut().zip(kind.params()) {
            *value = spec.default;
        }
        let rate = kind.periodic_param().map(|i| values[i]).unwrap_or(0.0);
        Self {
            enabled: false,
            values,
            phase: PhaseAccumulator::new(rate),
        }
    }
}

/// Evolving state kept for the modulators that need it.
#[derive(Debug, Clone, Copy)]
enum ModulatorState {
    Stateless,
    Walk(RandomWalk),
    Stripes(StripeGate),
    Falling(FallingHarmonics),
}

impl ModulatorState {
    fn for_kind(kind: ModulatorKind) -> Self {
        match kind {
            ModulatorKind::RandomWalk => ModulatorState::Walk(RandomWalk::new()),
            ModulatorKind::BarberPole => ModulatorState::Stripes(StripeGate::new()),
            ModulatorKind::FallingHarmonics => ModulatorState::Falling(FallingHarmonics::new()),
            _ => ModulatorState::Stateless,
        }
    }
}

/// Every modulator, its parameters and its state.
///
/// Owned by the render context. Fixed-size tables only; nothing here
/// allocates after construction.
pub struct ModulatorBank {
    slots: [ModulatorSlot; ModulatorKind::COUNT],
    states: [ModulatorState; ModulatorKind::COUNT],
    rng: SmallRng,
}

impl ModulatorBank {
    /// All modulators start disabled at their schema defaults.
    pub fn new(seed: u64) -> Self {
        Self {
            slots: ModulatorKind::ALL.map(ModulatorSlot::new),
            states: ModulatorKind::ALL.map(ModulatorState::for_kind),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn set_enabled(&mut self, kind: ModulatorKind, enabled: bool) {
        self.slots[kind.index()].enabled = enabled;
    }

    pub fn is_enabled(&self, kind: ModulatorKind) -> bool {
        self.slots[kind.index()].enabled
    }

    /// Write a parameter, clamped to its schema range. Returns `false` for
    /// an index the kind does not have.
    pub fn set_param(&mut self, kind: ModulatorKind, index: usize, value: f64) -> bool {
        let Some(spec) = kind.params().get(index) else {
            return false;
        };
        let slot = &mut self.slots[kind.index()];
        slot.values[index] = spec.clamp(value);
        if spec.periodic {
            slot.phase.set_rate(slot.values[index]);
        }
        true
    }

    pub fn param(&self, kind: ModulatorKind, index: usize) -> Option<f64> {
        kind.params()
            .get(index)
            .map(|_| self.slots[kind.index()].values[index])
    }

    /// Move every phase to `current_sample` and every enabled state machine
    /// forward by `dt` seconds. Call once per block.
    pub fn advance(&mut self, current_sample: u64, sample_rate: f64, dt: f64) {
        for slot in self.slots.iter_mut() {
            slot.phase.advance(current_sample, sample_rate);
        }

        for kind in ModulatorKind::ALL {
            let slot = &self.slots[kind.index()];
            if !slot.enabled {
                continue;
            }
            let values = slot.values;
            match &mut self.states[kind.index()] {
                ModulatorState::Walk(walk) => walk.advance(dt, values[0], &mut self.rng),
                ModulatorState::Stripes(stripes) => stripes.advance(dt, values[0], values[1]),
                ModulatorState::Falling(falling) => falling.advance(values[0], &mut self.rng),
                ModulatorState::Stateless => {}
            }
        }
    }

    /// Raw output of one modulator for one partial, enabled or not.
    pub fn value(&self, kind: ModulatorKind, partial: usize, ctx: &EvalCtx) -> f64 {
        let slot = &self.slots[kind.index()];
        let state = &self.states[kind.index()];
        let n = (partial + 1) as f64;

        match kind {
            ModulatorKind::Lfo => {
                let [_, amount, offset, spread] = slot.values;
                let phase_offset = spread * partial as f64 / NUM_PARTIALS as f64;
                offset + amount * slot.phase.sin_at(ctx.sample_offset, ctx.sample_rate, phase_offset)
            }
            ModulatorKind::RandomWalk => {
                let depth = slot.values[1];
                match state {
                    ModulatorState::Walk(walk) => 1.0 + depth * walk.value(partial),
                    _ => 1.0,
                }
            }
            ModulatorKind::LowPass => {
                let [cutoff, slope, resonance, _] = slot.values;
                shapes::low_pass(n, cutoff, slope, resonance)
            }
            ModulatorKind::HighPass => {
                let [cutoff, slope, resonance, _] = slot.values;
                shapes::high_pass(n, cutoff, slope, resonance)
            }
            ModulatorKind::Comb => {
                let [spacing, phase, _, _] = slot.values;
                let drift = slot.phase.phase_at(ctx.sample_offset, ctx.sample_rate, 0.0);
                shapes::comb(n, spacing, phase + TAU * drift)
            }
            ModulatorKind::PulseWidth => {
                let [duty, depth, _, _] = slot.values;
                let wobble = slot.phase.sin_at(ctx.sample_offset, ctx.sample_rate, 0.0);
                shapes::pulse_width(n, duty + depth * wobble)
            }
            ModulatorKind::Wavefolder => {
                let [fold, asymmetry, _, _] = slot.values;
                let normalized = partial as f64 / (NUM_PARTIALS - 1) as f64;
                shapes::wavefolder(n, fold, asymmetry, normalized)
            }
            ModulatorKind::BarberPole => {
                let [_, density, sharpness, _] = slot.values;
                match state {
                    ModulatorState::Stripes(stripes) => {
                        shapes::stripe(stripes.position(n, density), sharpness)
                    }
                    _ => 1.0,
                }
            }
            ModulatorKind::FallingHarmonics => match state {
                ModulatorState::Falling(falling) => falling.gate(partial),
                _ => 1.0,
            },
            ModulatorKind::Formant => {
                let [morph, q, _, _] = slot.values;
                let formants = shapes::vowel_formants(morph);
                shapes::formant(ctx.fundamental * n, &formants, q)
            }
        }
    }

    /// Factor this modulator contributes to the product: its value when
    /// enabled, 1.0 otherwise.
    pub fn contribution(&self, kind: ModulatorKind, partial: usize, ctx: &EvalCtx) -> f64 {
        if self.is_enabled(kind) {
            self.value(kind, partial, ctx)
        } else {
            1.0
        }
    }

    /// Value shown to the UI: disabled gates read 0.0, other disabled
    /// modulators 1.0.
    pub fn display_value(&self, kind: ModulatorKind, partial: usize, ctx: &EvalCtx) -> f64 {
        if self.is_enabled(kind) {
            self.value(kind, partial, ctx)
        } else if kind.is_gate() {
            0.0
        } else {
            1.0
        }
    }

    /// Product of every enabled modulator for one partial, before headroom
    /// scaling and the external gate.
    pub fn combined(&self, partial: usize, ctx: &EvalCtx) -> f64 {
        ModulatorKind::ALL
            .iter()
            .filter(|kind| self.is_enabled(**kind))
            .map(|&kind| self.value(kind, partial, ctx))
            .product()
    }
}
