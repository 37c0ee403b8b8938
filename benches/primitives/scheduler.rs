//! Benchmarks for encoding one block's event batch.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use partials::{engine::SineEventScheduler, timing::EventTimestampTracker, NUM_PARTIALS};

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/scheduler");

    // Events per partial per block at the default 128-sample interval
    for &events in &[2usize, 4, 8] {
        let mut scheduler = SineEventScheduler::new(NUM_PARTIALS, 8);
        group.bench_with_input(BenchmarkId::new("encode", events), &events, |b, &events| {
            b.iter(|| {
                scheduler.begin_frame();
                for sine in 0..NUM_PARTIALS as u32 {
                    scheduler.begin_sine(sine, false);
                    for e in 0..events as u64 {
                        scheduler.add_amplitude_event(black_box(e * 128), 0.5);
                        scheduler.add_frequency_event(black_box(e * 128), 440.0);
                    }
                    scheduler.end_sine();
                }
                black_box(scheduler.amplitude_buffer().len());
            })
        });
    }

    // Cursor walk across consecutive blocks
    let mut trackers = [EventTimestampTracker::new(128); NUM_PARTIALS];
    let mut now = 0u64;
    group.bench_function("timestamps", |b| {
        b.iter(|| {
            for tracker in trackers.iter_mut() {
                for sample in tracker.generate_samples(now, now + 256) {
                    black_box(sample);
                }
            }
            now += 128;
        })
    });

    group.finish();
}
