// IndexEngine wiring for TrieSpline.

use std::time::Instant;

use crate::engine::{IndexEngine, Workload, NOT_FOUND, OVERFLOW};
use crate::entry::{first_disorder, KeyValue};
use crate::key::IndexKey;
use crate::search::{BranchingBinarySearch, Searcher};
use crate::spline::index::SplineIndex;

/// TrieSpline as a complete [`IndexEngine`].
pub struct SplineEngine<K: IndexKey, S: Searcher<K> = BranchingBinarySearch> {
    spline_max_error: u32,
    data: Vec<KeyValue<K>>,
    keys: Vec<K>,
    spline: SplineIndex<K>,
    searcher: S,
}

impl<K: IndexKey, S: Searcher<K> + Default> SplineEngine<K, S> {
    pub fn new(spline_max_error: u32) -> Self {
        Self {
            spline_max_error,
            data: Vec::new(),
            keys: Vec::new(),
            spline: SplineIndex::build(&[], spline_max_error),
            searcher: S::default(),
        }
    }
}

impl<K: IndexKey, S: Searcher<K>> IndexEngine<K> for SplineEngine<K, S> {
    fn build(&mut self, sorted_data: &[KeyValue<K>], num_threads: usize) -> u128 {
        debug_assert_eq!(num_threads, 1, "TrieSpline build is single-threaded only");
        debug_assert!(first_disorder(sorted_data).is_none(), "build input must be sorted");

        let start = Instant::now();
        self.keys = sorted_data.iter().map(|kv| kv.key).collect();
        self.spline = SplineIndex::build(&self.keys, self.spline_max_error);
        self.data = sorted_data.to_vec();
        start.elapsed().as_nanos()
    }

    fn equality_lookup(&self, key: K, _thread_id: usize) -> u64 {
        if self.data.is_empty() {
            return OVERFLOW;
        }
        if key.as_u64() < self.keys[0].as_u64() || key.as_u64() > self.keys[self.keys.len() - 1].as_u64() {
            return OVERFLOW;
        }
        let bound = self.spline.search_bound(key);
        let pos = self.searcher.lower_bound(&self.keys, bound.begin, bound.end, key, bound.begin);
        if pos < self.data.len() && self.data[pos].key == key {
            self.data[pos].payload
        } else {
            NOT_FOUND
        }
    }

    fn range_query(&self, low: K, high: K, _thread_id: usize) -> u64 {
        if low > high || self.data.is_empty() {
            return 0;
        }
        let bound = self.spline.search_bound(low);
        let start = self.searcher.lower_bound(&self.keys, bound.begin, bound.end, low, bound.begin);
        let mut sum = 0u64;
        let mut i = start;
        while i < self.data.len() && self.data[i].key <= high {
            sum = sum.wrapping_add(self.data[i].payload);
            i += 1;
        }
        sum
    }

    fn name(&self) -> String {
        format!("trie_spline(spline_max_error={})", self.spline_max_error)
    }

    fn size(&self) -> usize {
        self.spline.size_bytes() + self.data.len() * std::mem::size_of::<KeyValue<K>>()
    }

    fn applicable(&self, workload: Workload) -> bool {
        !workload.insert
    }
}
