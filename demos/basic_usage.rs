// Build all four engines over the same key set and run a lookup and a
// range query through each.

use index_engines::cht::Params;
use index_engines::search::BranchingBinarySearch;
use index_engines::{ChtIndex, FastEngine, FstEngine, IndexEngine, KeyValue, SplineEngine};

fn main() {
    env_logger::init();

    let data: Vec<KeyValue<u64>> = (0..100_000u64).map(|i| KeyValue::new(i * 7, i)).collect();
    let probe = data[12_345].key;

    let mut cht: ChtIndex<u64, BranchingBinarySearch> = ChtIndex::new(Params::default()).unwrap();
    let cht_ns = cht.build(&data, 1);
    println!(
        "{}: built in {cht_ns}ns, size {}B, lookup({probe}) = {}",
        cht.name(),
        cht.size(),
        cht.equality_lookup(probe, 0)
    );

    let mut spline: SplineEngine<u64, BranchingBinarySearch> = SplineEngine::new(32);
    let spline_ns = spline.build(&data, 1);
    println!(
        "{}: built in {spline_ns}ns, size {}B, range_query(0, 10_000) = {}",
        spline.name(),
        spline.size(),
        spline.range_query(0, 10_000, 0)
    );

    let mut fst: FstEngine<u64> = FstEngine::default();
    let fst_ns = fst.build(&data, 1);
    println!(
        "{}: built in {fst_ns}ns, size {}B, lookup({probe}) = {}",
        fst.name(),
        fst.size(),
        fst.equality_lookup(probe, 0)
    );

    let mut fast: FastEngine<u64> = FastEngine::default();
    let fast_ns = fast.build(&data, 1);
    println!(
        "{}: built in {fast_ns}ns, size {}B, lookup({probe}) = {}",
        fast.name(),
        fast.size(),
        fast.equality_lookup(probe, 0)
    );
}
