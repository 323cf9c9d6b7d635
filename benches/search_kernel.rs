// Compares the five final-mile search policies over a narrow, pre-bounded
// slice -- the hand-off point every accelerator (CHT, TrieSpline, FAST) ends
// at before returning a position to its caller.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use index_engines::search::{
    BranchingBinarySearch, ExponentialSearch, InterpolationSearch, LinearAvx, LinearSearch, Searcher,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANGE_LEN: usize = 64;
const NUM_PROBES: usize = 10_000;

fn bench_range(c: &mut Criterion) {
    let keys: Vec<u64> = (0..RANGE_LEN as u64).map(|i| i * 3).collect();
    let mut rng = StdRng::seed_from_u64(42);
    let probes: Vec<u64> = (0..NUM_PROBES).map(|_| rng.gen_range(0..RANGE_LEN as u64 * 3)).collect();

    let mut group = c.benchmark_group("lower_bound_over_64_keys");

    let linear = LinearSearch::default();
    group.bench_with_input(BenchmarkId::new("linear", RANGE_LEN), &probes, |b, probes| {
        b.iter(|| {
            for &p in probes {
                black_box(linear.lower_bound(&keys, 0, keys.len(), p, 0));
            }
        })
    });

    let branching = BranchingBinarySearch::default();
    group.bench_with_input(BenchmarkId::new("branching_binary", RANGE_LEN), &probes, |b, probes| {
        b.iter(|| {
            for &p in probes {
                black_box(branching.lower_bound(&keys, 0, keys.len(), p, 0));
            }
        })
    });

    let exponential = ExponentialSearch::default();
    group.bench_with_input(BenchmarkId::new("exponential", RANGE_LEN), &probes, |b, probes| {
        b.iter(|| {
            for &p in probes {
                black_box(exponential.lower_bound(&keys, 0, keys.len(), p, keys.len() / 2));
            }
        })
    });

    let interpolation = InterpolationSearch::default();
    group.bench_with_input(BenchmarkId::new("interpolation", RANGE_LEN), &probes, |b, probes| {
        b.iter(|| {
            for &p in probes {
                black_box(interpolation.lower_bound(&keys, 0, keys.len(), p, 0));
            }
        })
    });

    let simd_linear = LinearAvx::default();
    group.bench_with_input(BenchmarkId::new("simd_linear", RANGE_LEN), &probes, |b, probes| {
        b.iter(|| {
            for &p in probes {
                black_box(simd_linear.lower_bound(&keys, 0, keys.len(), p, 0));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_range);
criterion_main!(benches);
