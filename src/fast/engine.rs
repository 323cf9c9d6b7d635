// IndexEngine wiring for FAST (cache-line and SIMD tree).

use std::time::Instant;

use crate::engine::{IndexEngine, Workload, NOT_FOUND, OVERFLOW};
use crate::entry::{first_disorder, KeyValue};
use crate::fast::tree::FastTree;
use crate::key::IndexKey;

/// FAST as a complete [`IndexEngine`]: the implicit block-hierarchical tree
/// plus the sorted backing array it was built over.
///
/// FAST has no final-mile [`crate::search::Searcher`] hand-off -- its own
/// `lower_bound` already resolves to an exact array position.
pub struct FastEngine<K: IndexKey> {
    data: Vec<KeyValue<K>>,
    tree: FastTree<K>,
}

impl<K: IndexKey> FastEngine<K> {
    pub fn new() -> Self {
        Self { data: Vec::new(), tree: FastTree::build(&[]) }
    }
}

impl<K: IndexKey> Default for FastEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IndexKey> IndexEngine<K> for FastEngine<K> {
    fn build(&mut self, sorted_data: &[KeyValue<K>], num_threads: usize) -> u128 {
        debug_assert_eq!(num_threads, 1, "FAST build is single-threaded only");
        debug_assert!(first_disorder(sorted_data).is_none(), "build input must be sorted");

        let start = Instant::now();
        let keys: Vec<K> = sorted_data.iter().map(|kv| kv.key).collect();
        self.tree = FastTree::build(&keys);
        self.data = sorted_data.to_vec();
        start.elapsed().as_nanos()
    }

    fn equality_lookup(&self, key: K, _thread_id: usize) -> u64 {
        if self.data.is_empty() {
            return OVERFLOW;
        }
        if key < self.data[0].key || key > self.data[self.data.len() - 1].key {
            return OVERFLOW;
        }
        let pos = self.tree.lower_bound(key);
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
        let mut sum = 0u64;
        let mut i = self.tree.lower_bound(low);
        while i < self.data.len() && self.data[i].key <= high {
            sum = sum.wrapping_add(self.data[i].payload);
            i += 1;
        }
        sum
    }

    fn name(&self) -> String {
        "fast".into()
    }

    fn size(&self) -> usize {
        self.tree.size_bytes() + self.data.len() * std::mem::size_of::<KeyValue<K>>()
    }

    fn applicable(&self, workload: Workload) -> bool {
        !workload.insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_build_input() {
        let data: Vec<KeyValue<u64>> = (0..5000u64).map(|i| KeyValue::new(i * 3, i)).collect();
        let mut engine: FastEngine<u64> = FastEngine::new();
        engine.build(&data, 1);

        for kv in data.iter().step_by(41) {
            assert_eq!(engine.equality_lookup(kv.key, 0), kv.payload);
        }
        assert_eq!(engine.equality_lookup(1, 0), NOT_FOUND);
    }

    #[test]
    fn empty_index_overflows() {
        let engine: FastEngine<u32> = FastEngine::new();
        assert_eq!(engine.equality_lookup(5, 0), OVERFLOW);
    }

    #[test]
    fn out_of_range_key_overflows() {
        let data: Vec<KeyValue<u32>> = (0..500u32).map(|i| KeyValue::new(i * 2, i as u64)).collect();
        let mut engine: FastEngine<u32> = FastEngine::new();
        engine.build(&data, 1);
        assert_eq!(engine.equality_lookup(10_000, 0), OVERFLOW);
    }

    #[test]
    fn range_query_sums_matching_payloads() {
        let data: Vec<KeyValue<u32>> = (0..2000u32).map(|i| KeyValue::new(i * 5, i as u64)).collect();
        let mut engine: FastEngine<u32> = FastEngine::new();
        engine.build(&data, 1);
        let expected: u64 = data.iter().filter(|kv| kv.key >= 100 && kv.key <= 400).map(|kv| kv.payload).sum();
        assert_eq!(engine.range_query(100, 400, 0), expected);
    }
}
