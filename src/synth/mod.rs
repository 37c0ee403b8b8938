// Purpose: control surface of the render context
// Messages arrive from the UI/MIDI side through a wait-free queue

pub mod message;

pub use message::{ControlMessage, MessageReceiver, Payload};
