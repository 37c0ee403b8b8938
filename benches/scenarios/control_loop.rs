//! Benchmarks for the complete per-block loop.
//!
//! The reference sine bank does the rendering, so these numbers include 32
//! oscillators as well as scheduling.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use partials::{
    modulation::ModulatorKind, render::SineBank, synth::ControlMessage, EngineConfig,
    SynthEngine,
};
use rtrb::{Producer, RingBuffer};

fn running_engine(
    block_size: usize,
    modulators: &[ModulatorKind],
) -> (
    SynthEngine<SineBank, rtrb::Consumer<ControlMessage>, ()>,
    Producer<ControlMessage>,
) {
    let (mut tx, rx) = RingBuffer::new(64);
    let config = EngineConfig {
        block_size,
        ..EngineConfig::default()
    };
    let mut engine = SynthEngine::new(config, SineBank::new(), rx, ()).unwrap();

    tx.push(ControlMessage::Start).unwrap();
    tx.push(ControlMessage::SetGate(true)).unwrap();
    for &kind in modulators {
        tx.push(ControlMessage::SetEnabled {
            kind,
            enabled: true,
        })
        .unwrap();
    }
    let mut warmup = vec![0.0f32; block_size];
    engine.process_block(&mut warmup);
    (engine, tx)
}

pub fn bench_control_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/control_loop");

    for &size in crate::BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === STEADY DRONE ===
        // Gate held, no modulators: scheduling plus rendering baseline
        let (mut drone, _tx) = running_engine(size, &[]);
        group.bench_with_input(BenchmarkId::new("drone", size), &size, |b, _| {
            b.iter(|| drone.process_block(black_box(&mut buffer)))
        });

        // === ANIMATED PATCH ===
        // Typical live setting: filter, lfo, comb and barber pole
        let (mut animated, _tx) = running_engine(
            size,
            &[
                ModulatorKind::LowPass,
                ModulatorKind::Lfo,
                ModulatorKind::Comb,
                ModulatorKind::BarberPole,
            ],
        );
        group.bench_with_input(BenchmarkId::new("animated", size), &size, |b, _| {
            b.iter(|| animated.process_block(black_box(&mut buffer)))
        });

        // === PLAYED ===
        // Gate toggled every block: override ramps on every partial
        let (mut played, mut tx) = running_engine(size, &[ModulatorKind::Formant]);
        let mut gate = true;
        group.bench_with_input(BenchmarkId::new("played", size), &size, |b, _| {
            b.iter(|| {
                gate = !gate;
                let _ = tx.push(ControlMessage::SetGate(gate));
                played.process_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
