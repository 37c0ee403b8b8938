//! Error type shared by the engine, the renderer contract and configuration.
//!
//! Every variant used on the audio thread carries only `Copy` data, so a
//! failure can be built and returned mid-block without touching the heap.

use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("Invalid engine configuration: {}", field))]
    InvalidConfig { field: &'static str },

    #[snafu(display("Could not parse configuration: {}", message))]
    ConfigParse { message: String },

    #[snafu(display("Renderer failed to initialize"))]
    RendererInit,

    #[snafu(display("Renderer allocated {} sines, {} were requested", got, requested))]
    SineAllocation { requested: usize, got: usize },

    #[snafu(display("Malformed event batch for sine {}", sine))]
    EventsRejected { sine: u32 },

    #[snafu(display("Event at sample {} for sine {} is not after the previous one", sample, sine))]
    NonMonotonic { sine: u32, sample: u64 },

    #[snafu(display("Event staging queue for sine {} is full", sine))]
    StagingFull { sine: u32 },

    #[snafu(display("Sine {} does not exist", sine))]
    UnknownSine { sine: u32 },

    #[snafu(display("Block of {} frames exceeds the maximum block size", frames))]
    BlockTooLarge { frames: usize },

    #[snafu(display("Renderer has not been initialized"))]
    NotStarted,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_sine() {
        let err = Error::NonMonotonic { sine: 3, sample: 256 };
        let text = err.to_string();
        assert!(text.contains("sine 3"), "unexpected message: {}", text);
        assert!(text.contains("256"), "unexpected message: {}", text);
    }
}
