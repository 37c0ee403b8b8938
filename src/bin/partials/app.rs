//! Audio device setup and the bridge between the UI and the engine

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use partials::{
    engine::TelemetrySnapshot, render::SineBank, synth::ControlMessage, EngineConfig,
    SynthEngine,
};

use super::ui::UiApp;

/// Queue depth for UI to audio messages. Key repeat never gets close.
const CONTROL_QUEUE: usize = 256;
/// Snapshots waiting for the UI; older ones are worthless anyway.
const TELEMETRY_QUEUE: usize = 16;

pub struct Partials {
    config: EngineConfig,
}

impl Partials {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the default output, start the engine and hand over to the TUI.
    pub fn run(mut self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let channels = stream_config.channels() as usize;
        self.config.sample_rate = stream_config.sample_rate().0 as f64;
        self.config.validate().wrap_err("device sample rate rejected")?;
        info!(
            sample_rate = self.config.sample_rate,
            channels,
            block_size = self.config.block_size,
            "opened output device"
        );

        let (mut control_tx, control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE);
        let (telemetry_tx, telemetry_rx) = RingBuffer::<TelemetrySnapshot>::new(TELEMETRY_QUEUE);

        let mut engine = SynthEngine::new(self.config.clone(), SineBank::new(), control_rx, telemetry_tx)?;
        let block_size = self.config.block_size;
        let mut render_buf = vec![0.0f32; block_size];

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(block_size);
                    let block = &mut render_buf[..frames_to_render];
                    engine.process_block(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;
        control_tx
            .push(ControlMessage::Start)
            .map_err(|_| eyre!("control queue full before start"))?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(control_tx, telemetry_rx, &self.config).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}
