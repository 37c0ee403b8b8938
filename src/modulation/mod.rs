//! Modulator registry.
//!
//! Every effect is a variant of the closed [`ModulatorKind`] enum with a
//! declarative parameter schema. The [`bank::ModulatorBank`] owns parameter
//! values, enable flags, phases and per-modulator state, and combines all
//! enabled modulators multiplicatively per partial.

use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod bank;
/// Pure per-harmonic curves.
pub mod shapes;
/// State machines advanced once per block.
pub mod state;

pub use bank::{EvalCtx, ModulatorBank};

/// Upper bound on parameters per modulator.
pub const MAX_PARAMS: usize = 4;

/// One entry of a modulator's parameter schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    /// The parameter is a rate in Hz driving the modulator's phase.
    pub periodic: bool,
}

impl ParamSpec {
    const fn new(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            default,
            min,
            max,
            periodic: false,
        }
    }

    const fn rate(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            default,
            min,
            max,
            periodic: true,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

const LFO_PARAMS: [ParamSpec; 4] = [
    ParamSpec::rate("rate", 0.5, 0.0, 20.0),
    ParamSpec::new("amount", 0.5, 0.0, 1.0),
    ParamSpec::new("offset", 1.0, 0.0, 2.0),
    // cycles of phase spread across the bank
    ParamSpec::new("spread", 0.0, 0.0, 1.0),
];

const RANDOM_WALK_PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("change_rate", 4.0, 0.0, 50.0),
    ParamSpec::new("depth", 0.5, 0.0, 1.0),
];

const LOW_PASS_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("cutoff", 8.0, 1.0, 32.0),
    ParamSpec::new("slope", 2.0, 0.5, 8.0),
    ParamSpec::new("resonance", 0.0, 0.0, 2.0),
];

const HIGH_PASS_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("cutoff", 4.0, 1.0, 32.0),
    ParamSpec::new("slope", 2.0, 0.5, 8.0),
    ParamSpec::new("resonance", 0.0, 0.0, 2.0),
];

const COMB_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("spacing", 4.0, 1.0, 32.0),
    ParamSpec::new("phase", 0.0, 0.0, TAU),
    ParamSpec::rate("drift", 0.0, 0.0, 10.0),
];

const PULSE_WIDTH_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("duty", 0.5, 0.0, 1.0),
    ParamSpec::new("depth", 0.0, 0.0, 0.5),
    ParamSpec::rate("rate", 0.2, 0.0, 10.0),
];

const WAVEFOLDER_PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("fold", 1.5, 0.1, 8.0),
    ParamSpec::new("asymmetry", 0.0, -1.0, 1.0),
];

const BARBER_POLE_PARAMS: [ParamSpec; 3] = [
    ParamSpec::new("speed", 1.0, -8.0, 8.0),
    ParamSpec::new("density", 4.0, -16.0, 16.0),
    ParamSpec::new("sharpness", 4.0, 0.5, 16.0),
];

const FALLING_PARAMS: [ParamSpec; 1] = [ParamSpec::new("probability", 0.3, 0.0, 1.0)];

const FORMANT_PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("morph", 0.0, 0.0, 1.0),
    ParamSpec::new("q", 4.0, 0.5, 20.0),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulatorKind {
    Lfo,
    RandomWalk,
    LowPass,
    HighPass,
    Comb,
    PulseWidth,
    Wavefolder,
    BarberPole,
    FallingHarmonics,
    Formant,
}

impl ModulatorKind {
    pub const COUNT: usize = 10;

    pub const ALL: [ModulatorKind; Self::COUNT] = [
        ModulatorKind::Lfo,
        ModulatorKind::RandomWalk,
        ModulatorKind::LowPass,
        ModulatorKind::HighPass,
        ModulatorKind::Comb,
        ModulatorKind::PulseWidth,
        ModulatorKind::Wavefolder,
        ModulatorKind::BarberPole,
        ModulatorKind::FallingHarmonics,
        ModulatorKind::Formant,
    ];

    /// Position in [`ModulatorKind::ALL`], used to index per-kind tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tag used by the control surface and the UI.
    pub fn name(self) -> &'static str {
        match self {
            ModulatorKind::Lfo => "lfo",
            ModulatorKind::RandomWalk => "random_walk",
            ModulatorKind::LowPass => "low_pass",
            ModulatorKind::HighPass => "high_pass",
            ModulatorKind::Comb => "comb",
            ModulatorKind::PulseWidth => "pulse_width",
            ModulatorKind::Wavefolder => "wavefolder",
            ModulatorKind::BarberPole => "barber_pole",
            ModulatorKind::FallingHarmonics => "falling_harmonics",
            ModulatorKind::Formant => "formant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            ModulatorKind::Lfo => &LFO_PARAMS,
            ModulatorKind::RandomWalk => &RANDOM_WALK_PARAMS,
            ModulatorKind::LowPass => &LOW_PASS_PARAMS,
            ModulatorKind::HighPass => &HIGH_PASS_PARAMS,
            ModulatorKind::Comb => &COMB_PARAMS,
            ModulatorKind::PulseWidth => &PULSE_WIDTH_PARAMS,
            ModulatorKind::Wavefolder => &WAVEFOLDER_PARAMS,
            ModulatorKind::BarberPole => &BARBER_POLE_PARAMS,
            ModulatorKind::FallingHarmonics => &FALLING_PARAMS,
            ModulatorKind::Formant => &FORMANT_PARAMS,
        }
    }

    pub fn param_index(self, name: &str) -> Option<usize> {
        self.params().iter().position(|p| p.name == name)
    }

    /// Binary on/off gates read as 0.0 while disabled; everything else
    /// reads as the neutral 1.0.
    pub fn is_gate(self) -> bool {
        matches!(self, ModulatorKind::FallingHarmonics)
    }

    /// Index of the parameter driving this kind's phase, if it has one.
    pub fn periodic_param(self) -> Option<usize> {
        self.params().iter().position(|p| p.periodic)
    }
}
