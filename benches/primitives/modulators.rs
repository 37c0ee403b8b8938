//! Benchmarks for per-partial modulator evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use partials::{
    modulation::{EvalCtx, ModulatorBank, ModulatorKind},
    NUM_PARTIALS,
};

pub fn bench_modulators(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives/modulators");
    let ctx = EvalCtx::new(64.0, 48_000.0, 110.0);

    // One kind at a time: shows which shapes are expensive
    for kind in ModulatorKind::ALL {
        let mut bank = ModulatorBank::new(7);
        bank.set_enabled(kind, true);
        bank.advance(0, 48_000.0, 128.0 / 48_000.0);

        group.bench_with_input(BenchmarkId::new("single", kind.name()), &kind, |b, _| {
            b.iter(|| {
                for p in 0..NUM_PARTIALS {
                    black_box(bank.combined(p, black_box(&ctx)));
                }
            })
        });
    }

    // Everything enabled: worst case for one scheduled event per partial
    let mut bank = ModulatorBank::new(7);
    for kind in ModulatorKind::ALL {
        bank.set_enabled(kind, true);
    }
    let mut position = 0u64;
    group.bench_function("all_enabled", |b| {
        b.iter(|| {
            position += 128;
            bank.advance(position, 48_000.0, 128.0 / 48_000.0);
            for p in 0..NUM_PARTIALS {
                black_box(bank.combined(p, black_box(&ctx)));
            }
        })
    });

    group.finish();
}
