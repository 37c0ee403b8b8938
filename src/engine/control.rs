use tracing::{error, info};

use super::{
    scheduler::SineEventScheduler,
    telemetry::{EngineStats, TelemetrySink, TelemetrySnapshot},
};
use crate::{
    config::EngineConfig,
    error::{Error, Result},
    modulation::{EvalCtx, ModulatorBank, ModulatorKind},
    render::{SineId, SineRenderer},
    synth::message::{ControlMessage, MessageReceiver},
    timing::EventTimestampTracker,
    NUM_PARTIALS,
};

/*
The Control Loop
================

Runs once per audio block inside the audio callback:

  1. drain control messages (last write wins per parameter)
  2. read the renderer's sample position
  3. advance phases to that position, state machines by the elapsed time
  4. for every partial and stream:
       - control edge on this stream?  inject an override ramp
       - otherwise                     schedule the regular grid
  5. hand both event batches to the renderer
  6. render the block (silence on failure)
  7. every Nth block, publish a telemetry snapshot

Override Ramps
--------------

A gate or pitch change must be heard now, not at the next grid point, and
must not click. For each affected stream we emit two points:

    A = (now,         value under the OLD controls)
    B = (now + ramp,  value under the NEW controls)

with the override flag set, so the renderer drops everything it had staged
from A onwards. A pins the output to what it is already playing; the
renderer then ramps to B over `ramp` samples. The stream's cursor moves to
B and the regular grid resumes one interval after it, in the same block, so
the lookahead horizon never shrinks.

A gate edge overrides the amplitude stream only. A pitch edge overrides
both: frequency obviously, and amplitude because the Nyquist guard and the
formant filter read the fundamental. A second edge while a ramp is in flight
starts a new ramp from whatever is live; nothing needs cancelling.

Real-time Rules
---------------

No locks, no allocation, no blocking after `start`. Renderer failures are
counted in `EngineStats` and never retried inside the block.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Waiting for `Start`; output is silent
    Idle,
    Running,
    /// The renderer failed to initialize; output stays silent for good
    Failed,
}

/// External controls sampled once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub pitch_ratio: f64,
    pub gate: bool,
    pub base_frequency: f64,
}

impl Controls {
    fn fundamental(&self) -> f64 {
        self.base_frequency * self.pitch_ratio
    }

    fn frequency(&self, partial: usize) -> f64 {
        self.fundamental() * (partial + 1) as f64
    }
}

/// One harmonic: its renderer id and a cursor per stream.
#[derive(Debug, Clone, Copy)]
struct Partial {
    sine: SineId,
    amplitude: EventTimestampTracker,
    frequency: EventTimestampTracker,
}

/// Amplitude event value: modulator product over headroom, times the gate.
/// Partials at or above Nyquist are silenced.
fn amplitude_value(
    bank: &ModulatorBank,
    config: &EngineConfig,
    controls: &Controls,
    partial: usize,
    sample_offset: f64,
) -> f64 {
    if !controls.gate || controls.frequency(partial) >= config.nyquist() {
        return 0.0;
    }
    let ctx = EvalCtx::new(sample_offset, config.sample_rate, controls.fundamental());
    bank.combined(partial, &ctx) / config.headroom
}

/// The real-time control loop driving a [`SineRenderer`].
pub struct SynthEngine<R, Rx, T> {
    config: EngineConfig,
    renderer: R,
    rx: Rx,
    telemetry: T,
    bank: ModulatorBank,
    scheduler: SineEventScheduler,
    partials: [Partial; NUM_PARTIALS],
    /// Latest values from the control context
    controls: Controls,
    /// Controls the scheduled events currently reflect
    applied: Controls,
    status: EngineStatus,
    stats: EngineStats,
    block_counter: u32,
    last_position: Option<u64>,
    first_amplitude: [f64; NUM_PARTIALS],
    snapshot: TelemetrySnapshot,
}

impl<R, Rx, T> SynthEngine<R, Rx, T>
where
    R: SineRenderer,
    Rx: MessageReceiver,
    T: TelemetrySink,
{
    /// Build the engine and preallocate every buffer. The renderer is not
    /// touched until `start`.
    pub fn new(config: EngineConfig, renderer: R, rx: Rx, telemetry: T) -> Result<Self> {
        config.validate()?;

        let tracker = EventTimestampTracker::new(config.event_interval);
        let partial = Partial {
            sine: 0,
            amplitude: tracker,
            frequency: tracker,
        };
        let controls = Controls {
            pitch_ratio: 1.0,
            gate: false,
            base_frequency: config.base_frequency,
        };

        Ok(Self {
            scheduler: SineEventScheduler::new(NUM_PARTIALS, config.max_events_per_partial),
            bank: ModulatorBank::new(config.seed),
            config,
            renderer,
            rx,
            telemetry,
            partials: [partial; NUM_PARTIALS],
            controls,
            applied: controls,
            status: EngineStatus::Idle,
            stats: EngineStats::default(),
            block_counter: 0,
            last_position: None,
            first_amplitude: [0.0; NUM_PARTIALS],
            snapshot: TelemetrySnapshot::new(),
        })
    }

    /// Initialize the renderer and create every partial at once.
    ///
    /// Calling it again while running resets the renderer and every cursor.
    /// A failure is fatal: the engine stays silent from then on.
    pub fn start(&mut self) -> Result<()> {
        if self.status == EngineStatus::Failed {
            return Err(Error::RendererInit);
        }
        if self.status == EngineStatus::Running {
            self.renderer.reset();
        }

        match self.try_start() {
            Ok(()) => {
                self.status = EngineStatus::Running;
                info!(
                    sample_rate = self.config.sample_rate,
                    partials = NUM_PARTIALS,
                    "synthesis started"
                );
                Ok(())
            }
            Err(err) => {
                self.status = EngineStatus::Failed;
                error!(%err, "renderer initialization failed, output stays silent");
                Err(err)
            }
        }
    }

    fn try_start(&mut self) -> Result<()> {
        self.renderer.init(self.config.sample_rate)?;

        // Spread starting phases to keep the summed waveform's crest factor down
        let mut phases = [0.0; NUM_PARTIALS];
        for (i, phase) in phases.iter_mut().enumerate() {
            *phase = (i as f64 * 0.618_033_988_75).fract();
        }
        let ids = self.renderer.add_sines(&phases)?;
        if ids.len() != NUM_PARTIALS {
            return Err(Error::SineAllocation {
                requested: NUM_PARTIALS,
                got: ids.len(),
            });
        }

        for (partial, &id) in self.partials.iter_mut().zip(&ids) {
            partial.sine = id;
            partial.amplitude.reset();
            partial.frequency.reset();
        }
        self.applied = self.controls;
        self.last_position = None;
        Ok(())
    }

    /// Apply one control message. Called for every queued message at the
    /// top of each block.
    pub fn handle_message(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Start => {
                // Failure is logged and latched in `status`
                let _ = self.start();
            }
            ControlMessage::SetPitchRatio(ratio) => {
                if ratio.is_finite() && ratio > 0.0 {
                    self.controls.pitch_ratio = ratio;
                }
            }
            ControlMessage::SetGate(gate) => self.controls.gate = gate,
            ControlMessage::SetBaseFrequency(hz) => {
                if hz.is_finite() && hz > 0.0 {
                    self.controls.base_frequency = hz;
                }
            }
            ControlMessage::SetEnabled { kind, enabled } => self.bank.set_enabled(kind, enabled),
            ControlMessage::SetParam { kind, index, value } => {
                self.bank.set_param(kind, index as usize, value);
            }
        }
    }

    /// Produce audio into `out`. Slices longer than the configured block
    /// size are processed as consecutive blocks.
    pub fn process_block(&mut self, out: &mut [f32]) {
        let block_size = self.config.block_size;
        for block in out.chunks_mut(block_size) {
            self.process_one(block);
        }
    }

    fn process_one(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        if self.status != EngineStatus::Running {
            out.fill(0.0);
            return;
        }

        let now = self.renderer.current_sample_position();
        let elapsed = match self.last_position {
            Some(last) => now.saturating_sub(last),
            None => out.len() as u64,
        };
        self.bank
            .advance(now, self.config.sample_rate, elapsed as f64 / self.config.sample_rate);

        self.schedule(now, out.len() as u64);
        self.flush();

        if self.renderer.render(out).is_err() {
            out.fill(0.0);
            self.stats.silent_blocks += 1;
        }

        self.stats.blocks += 1;
        self.block_counter = self.block_counter.wrapping_add(1);
        if self.block_counter % self.config.telemetry_interval == 0 {
            self.publish_telemetry(now);
        }
        self.last_position = Some(now);
    }

    /// Encode this block's events for every partial.
    fn schedule(&mut self, now: u64, block_len: u64) {
        let gate_edge = self.controls.gate != self.applied.gate;
        let pitch_edge = self.controls.pitch_ratio != self.applied.pitch_ratio;
        if gate_edge || pitch_edge {
            self.stats.overrides += 1;
        }

        let target = now + block_len + self.config.lookahead;
        let ramp_end = now + self.config.override_ramp;
        let cap = self.scheduler.max_events_per_sine();
        let (old, new) = (self.applied, self.controls);

        // Amplitude depends on pitch too (Nyquist, formants)
        let amplitude_edge = gate_edge || pitch_edge;

        self.scheduler.begin_frame();
        for (i, partial) in self.partials.iter_mut().enumerate() {
            self.scheduler
                .begin_sine_streams(partial.sine, amplitude_edge, pitch_edge);

            let mut first = true;
            let mut ramped = 0;
            if amplitude_edge {
                let before = amplitude_value(&self.bank, &self.config, &old, i, 0.0);
                let after = amplitude_value(&self.bank, &self.config, &new, i, ramp_end as f64 - now as f64);
                self.scheduler.add_amplitude_event(now, before);
                self.scheduler.add_amplitude_event(ramp_end, after);
                partial.amplitude.mark_emitted(ramp_end);
                self.first_amplitude[i] = after;
                first = false;
                ramped = 2;
            }
            let due = partial.amplitude.count_events(now, target) + ramped;
            self.stats.capped_events += due.saturating_sub(cap) as u64;
            for sample in partial.amplitude.generate_samples(now, target) {
                let offset = sample as f64 - now as f64;
                let value = amplitude_value(&self.bank, &self.config, &new, i, offset);
                self.scheduler.add_amplitude_event(sample, value);
                if first {
                    self.first_amplitude[i] = value;
                    first = false;
                }
            }

            let mut ramped = 0;
            if pitch_edge {
                self.scheduler.add_frequency_event(now, old.frequency(i));
                self.scheduler.add_frequency_event(ramp_end, new.frequency(i));
                partial.frequency.mark_emitted(ramp_end);
                ramped = 2;
            }
            let due = partial.frequency.count_events(now, target) + ramped;
            self.stats.capped_events += due.saturating_sub(cap) as u64;
            for sample in partial.frequency.generate_samples(now, target) {
                self.scheduler.add_frequency_event(sample, new.frequency(i));
            }

            self.scheduler.end_sine();
        }

        self.applied = self.controls;
    }

    /// Hand the encoded batches to the renderer. A refused batch is dropped;
    /// the cursors have already moved on.
    fn flush(&mut self) {
        if self.scheduler.has_amplitude_events()
            && self
                .renderer
                .add_amplitude_events(self.scheduler.amplitude_buffer())
                .is_err()
        {
            self.stats.dropped_batches += 1;
        }
        if self.scheduler.has_frequency_events()
            && self
                .renderer
                .add_frequency_events(self.scheduler.frequency_buffer())
                .is_err()
        {
            self.stats.dropped_batches += 1;
        }
    }

    fn publish_telemetry(&mut self, now: u64) {
        let controls = self.controls;
        let ctx = EvalCtx::new(0.0, self.config.sample_rate, controls.fundamental());
        let snapshot = &mut self.snapshot;

        snapshot.sample_position = now;
        for kind in ModulatorKind::ALL {
            let row = &mut snapshot.modulators[kind.index()];
            for (p, value) in row.iter_mut().enumerate() {
                *value = self.bank.display_value(kind, p, &ctx) as f32;
            }
        }
        for p in 0..NUM_PARTIALS {
            snapshot.amplitude[p] = self.first_amplitude[p] as f32;
            snapshot.frequency[p] = controls.frequency(p) as f32;
        }
        snapshot.gate = controls.gate;
        snapshot.pitch_ratio = controls.pitch_ratio as f32;
        snapshot.stats = self.stats;

        self.telemetry.publish(snapshot);
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bank(&self) -> &ModulatorBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ModulatorBank {
        &mut self.bank
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renderer id of a partial, assigned at `start`.
    pub fn sine_id(&self, partial: usize) -> Option<SineId> {
        self.partials.get(partial).map(|p| p.sine)
    }

    /// Last emitted amplitude and frequency timestamps of a partial.
    pub fn cursors(&self, partial: usize) -> Option<(Option<u64>, Option<u64>)> {
        self.partials
            .get(partial)
            .map(|p| (p.amplitude.last_sample(), p.frequency.last_sample()))
    }

    /// Unscaled modulator product for a partial at the start of the block,
    /// before headroom and gate.
    pub fn combined_amplitude(&self, partial: usize) -> f64 {
        let ctx = EvalCtx::new(0.0, self.config.sample_rate, self.controls.fundamental());
        self.bank.combined(partial, &ctx)
    }
}
