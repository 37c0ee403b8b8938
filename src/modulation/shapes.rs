//! Closed-form spectral shapes.
//!
//! Every function here is pure: harmonic number in, scalar out. `n` is the
//! 1-indexed harmonic number (partial index + 1).

use std::f64::consts::{PI, TAU};

/*
Spectral Shaping
================

An additive synth has no audio-rate filter. "Filtering" means choosing a
gain per harmonic. Each shape below is a curve over harmonic number n that
the engine multiplies into that partial's amplitude.

  low-pass      1 / (1 + (n/cutoff)^(2·slope))
                Butterworth magnitude response, evaluated at the harmonic
                number instead of a frequency. `slope` sets steepness.

  high-pass     (n/cutoff)^(2·slope) / (1 + (n/cutoff)^(2·slope))
                The complement. Both share a resonance bump:

                  resonance · exp(-0.5 · ((n - cutoff) / (cutoff · 0.1))²)

                a Gaussian centered on the cutoff, 10% of cutoff wide.

  comb          0.5 + 0.5·cos(2π·n/spacing + phase)
                Peaks every `spacing` harmonics.

  pulse width   (2 / (n·π)) · sin(n·π·d)
                Fourier series of a pulse wave with duty cycle d.
                d = 0.5 gives the square wave (even harmonics vanish).

  wavefolder    sin(n·f)·cos(n/f)·(0.5 + 0.5·sin(n·π/f))
                A deliberately non-physical shape, rich and sparse.

  formant       Σ exp(-Q · log2(harmonic_hz / formant_hz)²)
                A Gaussian bump on a log-frequency axis for each of the
                three vowel formants. Q narrows the bumps.
*/

/// Width of the resonance bump relative to the cutoff.
const RESONANCE_WIDTH: f64 = 0.1;

/// Formant frequency triples (F1, F2, F3) in Hz for A, E, I, O, U.
pub const VOWEL_FORMANTS: [[f64; 3]; 5] = [
    [800.0, 1150.0, 2900.0],
    [350.0, 2000.0, 2800.0],
    [270.0, 2140.0, 2950.0],
    [450.0, 800.0, 2830.0],
    [325.0, 700.0, 2700.0],
];

#[inline]
fn resonance_bump(n: f64, cutoff: f64, resonance: f64) -> f64 {
    let width = cutoff * RESONANCE_WIDTH;
    let x = (n - cutoff) / width;
    resonance * (-0.5 * x * x).exp()
}

pub fn low_pass(n: f64, cutoff: f64, slope: f64, resonance: f64) -> f64 {
    let ratio = (n / cutoff).powf(2.0 * slope);
    1.0 / (1.0 + ratio) + resonance_bump(n, cutoff, resonance)
}

pub fn high_pass(n: f64, cutoff: f64, slope: f64, resonance: f64) -> f64 {
    let ratio = (n / cutoff).powf(2.0 * slope);
    ratio / (1.0 + ratio) + resonance_bump(n, cutoff, resonance)
}

pub fn comb(n: f64, spacing: f64, phase: f64) -> f64 {
    0.5 + 0.5 * (TAU * n / spacing + phase).cos()
}

pub fn pulse_width(n: f64, duty: f64) -> f64 {
    let d = duty.rem_euclid(1.0);
    (2.0 / (n * PI)) * (n * PI * d).sin()
}

/// `normalized` is the harmonic's position in the bank, 0.0 (first) to
/// 1.0 (last). Asymmetry stretches the fold amount toward the top.
pub fn wavefolder(n: f64, fold: f64, asymmetry: f64, normalized: f64) -> f64 {
    let f = fold * (1.0 + normalized * asymmetry);
    // keep clear of the n/f singularity
    let f = if f.abs() < 1e-3 { 1e-3f64.copysign(f) } else { f };
    (n * f).sin() * (n / f).cos() * (0.5 + 0.5 * (n * PI / f).sin())
}

/// Linear interpolation across the vowel table. `morph` 0.0 is A, 1.0 is U.
pub fn vowel_formants(morph: f64) -> [f64; 3] {
    let last = (VOWEL_FORMANTS.len() - 1) as f64;
    let pos = morph.clamp(0.0, 1.0) * last;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(VOWEL_FORMANTS.len() - 1);
    let t = pos - lo as f64;

    let mut out = [0.0; 3];
    for (i, f) in out.iter_mut().enumerate() {
        *f = VOWEL_FORMANTS[lo][i] * (1.0 - t) + VOWEL_FORMANTS[hi][i] * t;
    }
    out
}

pub fn formant(harmonic_hz: f64, formants: &[f64; 3], q: f64) -> f64 {
    if harmonic_hz <= 0.0 {
        return 0.0;
    }
    formants
        .iter()
        .map(|&f| {
            let octaves = (harmonic_hz / f).log2();
            (-q * octaves * octaves).exp()
        })
        .sum()
}

/// Raised-cosine stripe. `pos` is the stripe coordinate of a harmonic; the
/// output is 1.0 on integer positions and falls to 0.0 halfway between.
pub fn stripe(pos: f64, sharpness: f64) -> f64 {
    let frac = pos - pos.round();
    (PI * frac).cos().max(0.0).powf(sharpness)
}
