use index_engines::search::BranchingBinarySearch;
use index_engines::{IndexEngine, KeyValue, SplineEngine, NOT_FOUND, OVERFLOW};

fn build(n: u64, step: u64, max_error: u32) -> (SplineEngine<u64, BranchingBinarySearch>, Vec<KeyValue<u64>>) {
    let data: Vec<KeyValue<u64>> = (0..n).map(|i| KeyValue::new(i * step, i)).collect();
    let mut engine: SplineEngine<u64, BranchingBinarySearch> = SplineEngine::new(max_error);
    engine.build(&data, 1);
    (engine, data)
}

#[test]
fn every_built_key_round_trips() {
    let (engine, data) = build(20_000, 5, 16);
    for kv in data.iter().step_by(13) {
        assert_eq!(engine.equality_lookup(kv.key, 0), kv.payload);
    }
}

#[test]
fn absent_key_is_not_found() {
    let (engine, _data) = build(2_000, 10, 8);
    assert_eq!(engine.equality_lookup(3, 0), NOT_FOUND);
}

#[test]
fn key_outside_covered_range_overflows() {
    let (engine, _data) = build(2_000, 10, 8);
    assert_eq!(engine.equality_lookup(u64::MAX, 0), OVERFLOW);
}

#[test]
fn range_query_matches_brute_force_sum() {
    let (engine, data) = build(8_000, 3, 32);
    let expected: u64 = data.iter().filter(|kv| kv.key >= 900 && kv.key <= 9_000).map(|kv| kv.payload).sum();
    assert_eq!(engine.range_query(900, 9_000, 0), expected);
}

#[test]
fn empty_range_sums_to_zero() {
    let (engine, _data) = build(2_000, 10, 8);
    assert_eq!(engine.range_query(500, 100, 0), 0);
}
