// The uniform per-engine contract every index in this crate implements.
//
// The benchmark harness that drives these engines (dataset loading, CLI,
// thread pinning, measurement) lives outside this crate's scope; what
// remains here is the narrow surface the harness calls through.

use crate::entry::KeyValue;
use crate::key::IndexKey;

/// Lookup completed and the key is not present in the data.
pub const NOT_FOUND: u64 = u64::MAX;

/// Lookup aborted: the key falls outside the structure's covered range, or
/// the accelerator produced an empty bound.
pub const OVERFLOW: u64 = u64::MAX - 1;

/// The flag combination the harness checks an engine against before routing
/// a workload to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Workload {
    pub unique: bool,
    pub range_query: bool,
    pub insert: bool,
    pub multithread: bool,
}

/// Common contract for every ordered-key index engine.
///
/// `build` is only ever called once, single-threaded, before any reader
/// calls `equality_lookup`/`range_query`; nothing on the read path takes a
/// lock or mutates engine state.
pub trait IndexEngine<K: IndexKey> {
    /// Consume a key array already sorted in non-decreasing key order and
    /// construct the index. Returns the wall-clock build time in
    /// nanoseconds.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `sorted_data` is not sorted; behavior is
    /// unspecified in release builds and for `num_threads != 1`.
    fn build(&mut self, sorted_data: &[KeyValue<K>], num_threads: usize) -> u128;

    /// Look up a single key. Returns the payload, [`NOT_FOUND`] if the key
    /// is absent but within the structure's covered range, or [`OVERFLOW`]
    /// if the key falls outside it.
    fn equality_lookup(&self, key: K, thread_id: usize) -> u64;

    /// Sum the payloads of every key in the closed interval `[low, high]`.
    /// Zero on an empty range.
    fn range_query(&self, low: K, high: K, thread_id: usize) -> u64;

    /// Insert a single key/value pair. Not supported by any of the four
    /// core engines; only the thin third-party wrappers outside this
    /// crate's scope implement it.
    fn insert(&mut self, _kv: KeyValue<K>, _thread_id: usize) {
        unimplemented!("{} does not support insertion", self.name())
    }

    /// Short, stable engine name used in harness reports.
    fn name(&self) -> String;

    /// Approximate in-memory size of the built index, in bytes.
    fn size(&self) -> usize;

    /// Named configuration variants this engine instance can be built with
    /// (e.g. CHT's single-pass vs. two-pass build). Empty if the engine has
    /// no named variants.
    fn variants(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether this engine supports the requested combination of workload
    /// flags.
    fn applicable(&self, workload: Workload) -> bool;
}
