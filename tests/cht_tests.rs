use index_engines::cht::Params;
use index_engines::search::BranchingBinarySearch;
use index_engines::{ChtIndex, IndexEngine, KeyValue, NOT_FOUND, OVERFLOW};

fn build(n: u64, step: u64, params: Params) -> (ChtIndex<u64, BranchingBinarySearch>, Vec<KeyValue<u64>>) {
    let data: Vec<KeyValue<u64>> = (0..n).map(|i| KeyValue::new(i * step, i)).collect();
    let mut engine: ChtIndex<u64, BranchingBinarySearch> = ChtIndex::new(params).unwrap();
    engine.build(&data, 1);
    (engine, data)
}

#[test]
fn every_built_key_round_trips() {
    let (engine, data) = build(10_000, 3, Params::default());
    for kv in &data {
        assert_eq!(engine.equality_lookup(kv.key, 0), kv.payload);
    }
}

#[test]
fn absent_key_between_two_present_keys_is_not_found() {
    let (engine, _data) = build(1_000, 10, Params::default());
    assert_eq!(engine.equality_lookup(5, 0), NOT_FOUND);
}

#[test]
fn key_outside_covered_range_overflows() {
    let (engine, _data) = build(1_000, 10, Params::default());
    assert_eq!(engine.equality_lookup(u64::MAX, 0), OVERFLOW);
}

#[test]
fn range_query_matches_brute_force_sum() {
    let (engine, data) = build(5_000, 7, Params::default());
    let expected: u64 = data.iter().filter(|kv| kv.key >= 700 && kv.key <= 7_000).map(|kv| kv.payload).sum();
    assert_eq!(engine.range_query(700, 7_000, 0), expected);
}

#[test]
fn empty_index_overflows_on_any_key() {
    let engine: ChtIndex<u32, BranchingBinarySearch> = ChtIndex::new(Params::default()).unwrap();
    assert_eq!(engine.equality_lookup(0, 0), OVERFLOW);
}

#[test]
fn single_pass_and_cache_oblivious_is_rejected_at_construction() {
    let result: index_engines::error::Result<ChtIndex<u64, BranchingBinarySearch>> =
        ChtIndex::new(Params { single_pass: true, cache_oblivious: true, ..Default::default() });
    assert!(result.is_err());
}
