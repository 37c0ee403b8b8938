//! UI-side mirror of the engine's controls
//!
//! The engine never reports parameter values back, so the UI keeps its own
//! copy and turns edits into messages.

use partials::{
    modulation::{ModulatorKind, MAX_PARAMS},
    synth::ControlMessage,
};

/// Fraction of a parameter's range moved per key press.
const NUDGE: f64 = 0.05;

pub struct ControlState {
    pub gate: bool,
    /// Semitones away from the base frequency
    pub semitones: i32,
    pub base_frequency: f64,
    pub enabled: [bool; ModulatorKind::COUNT],
    pub values: [[f64; MAX_PARAMS]; ModulatorKind::COUNT],
    pub selected: ModulatorKind,
    pub param: usize,
}

impl ControlState {
    pub fn new(base_frequency: f64) -> Self {
        let mut values = [[0.0; MAX_PARAMS]; ModulatorKind::COUNT];
        for kind in ModulatorKind::ALL {
            for (slot, spec) in values[kind.index()].iter_mut().zip(kind.params()) {
                *slot = spec.default;
            }
        }
        Self {
            gate: false,
            semitones: 0,
            base_frequency,
            enabled: [false; ModulatorKind::COUNT],
            values,
            selected: ModulatorKind::ALL[0],
            param: 0,
        }
    }

    pub fn pitch_ratio(&self) -> f64 {
        2f64.powf(self.semitones as f64 / 12.0)
    }

    pub fn toggle_gate(&mut self) -> ControlMessage {
        self.gate = !self.gate;
        ControlMessage::SetGate(self.gate)
    }

    pub fn transpose(&mut self, semitones: i32) -> ControlMessage {
        self.semitones = (self.semitones + semitones).clamp(-24, 24);
        ControlMessage::SetPitchRatio(self.pitch_ratio())
    }

    pub fn toggle_modulator(&mut self, kind: ModulatorKind) -> ControlMessage {
        let enabled = &mut self.enabled[kind.index()];
        *enabled = !*enabled;
        self.selected = kind;
        self.param = 0;
        ControlMessage::SetEnabled {
            kind,
            enabled: *enabled,
        }
    }

    pub fn select_next_modulator(&mut self) {
        let next = (self.selected.index() + 1) % ModulatorKind::COUNT;
        self.selected = ModulatorKind::ALL[next];
        self.param = 0;
    }

    pub fn select_param(&mut self, step: isize) {
        let count = self.selected.params().len() as isize;
        self.param = (self.param as isize + step).rem_euclid(count) as usize;
    }

    /// Move the selected parameter by a step of its range.
    pub fn nudge_param(&mut self, direction: f64) -> Option<ControlMessage> {
        let kind = self.selected;
        let spec = kind.params().get(self.param)?;
        let value = &mut self.values[kind.index()][self.param];
        *value = spec.clamp(*value + direction * NUDGE * (spec.max - spec.min));
        Some(ControlMessage::SetParam {
            kind,
            index: self.param as u8,
            value: *value,
        })
    }
}
