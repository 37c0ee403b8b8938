#[cfg(feature = "rtrb")]
use rtrb::Consumer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::modulation::ModulatorKind;

/// Messages from the control context into the render context.
///
/// All variants are `Copy` scalar overwrites: applying them in any order
/// within a block gives the same result per parameter as long as the last
/// write wins.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Initialize the renderer and begin synthesis (restarts if running)
    Start,
    /// Pitch multiplier applied to every partial. Edge-triggered.
    SetPitchRatio(f64),
    /// External on/off gate (keyboard). Edge-triggered.
    SetGate(bool),
    SetBaseFrequency(f64),
    SetEnabled { kind: ModulatorKind, enabled: bool },
    SetParam { kind: ModulatorKind, index: u8, value: f64 },
}

/// Untyped payload accompanying a string tag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Payload {
    None,
    Scalar(f64),
    Flag(bool),
}

impl Payload {
    fn scalar(self) -> Option<f64> {
        match self {
            Payload::Scalar(v) => Some(v),
            Payload::Flag(b) => Some(if b { 1.0 } else { 0.0 }),
            Payload::None => None,
        }
    }

    fn flag(self) -> Option<bool> {
        match self {
            Payload::Flag(b) => Some(b),
            Payload::Scalar(v) => Some(v != 0.0),
            Payload::None => None,
        }
    }
}

impl ControlMessage {
    /// Map a string tag and payload onto a typed message.
    ///
    /// Tags: `start`, `pitch_ratio`, `gate`, `base_frequency`,
    /// `<modulator>.enabled` and `<modulator>.<param>`. Unknown tags and
    /// missing payloads give `None`.
    pub fn parse(tag: &str, payload: Payload) -> Option<Self> {
        match tag {
            "start" => return Some(ControlMessage::Start),
            "pitch_ratio" => return payload.scalar().map(ControlMessage::SetPitchRatio),
            "gate" => return payload.flag().map(ControlMessage::SetGate),
            "base_frequency" => return payload.scalar().map(ControlMessage::SetBaseFrequency),
            _ => {}
        }

        let (modulator, field) = tag.split_once('.')?;
        let kind = ModulatorKind::from_name(modulator)?;
        if field == "enabled" {
            let enabled = payload.flag()?;
            return Some(ControlMessage::SetEnabled { kind, enabled });
        }
        let index = kind.param_index(field)? as u8;
        let value = payload.scalar()?;
        Some(ControlMessage::SetParam { kind, index, value })
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}
