// IndexEngine wiring for FST, via the big-endian integer-key adaptor.

use std::time::Instant;

use crate::engine::{IndexEngine, Workload, NOT_FOUND, OVERFLOW};
use crate::entry::{first_disorder, KeyValue};
use crate::fst::index::FstTrie;
use crate::key::IndexKey;

const DEFAULT_SPARSE_DENSE_RATIO: u32 = 16;

/// FST as a complete [`IndexEngine`] over fixed-width integer keys, via the
/// big-endian byte adaptor.
pub struct FstEngine<K: IndexKey> {
    sparse_dense_ratio: u32,
    trie: FstTrie,
    len: usize,
    _marker: std::marker::PhantomData<K>,
}

impl<K: IndexKey> FstEngine<K> {
    pub fn new(sparse_dense_ratio: u32) -> Self {
        Self {
            sparse_dense_ratio,
            trie: FstTrie::build(&[], &[], sparse_dense_ratio),
            len: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<K: IndexKey> Default for FstEngine<K> {
    fn default() -> Self {
        Self::new(DEFAULT_SPARSE_DENSE_RATIO)
    }
}

impl<K: IndexKey> IndexEngine<K> for FstEngine<K> {
    fn build(&mut self, sorted_data: &[KeyValue<K>], num_threads: usize) -> u128 {
        debug_assert_eq!(num_threads, 1, "FST build is single-threaded only");
        debug_assert!(first_disorder(sorted_data).is_none(), "build input must be sorted");

        let start = Instant::now();
        let keys: Vec<Vec<u8>> = sorted_data.iter().map(|kv| kv.key.to_be_bytes_vec()).collect();
        let values: Vec<u64> = sorted_data.iter().map(|kv| kv.payload).collect();
        self.trie = FstTrie::build(&keys, &values, self.sparse_dense_ratio);
        self.len = sorted_data.len();
        start.elapsed().as_nanos()
    }

    fn equality_lookup(&self, key: K, _thread_id: usize) -> u64 {
        if self.len == 0 {
            return OVERFLOW;
        }
        self.trie.get(&key.to_be_bytes_vec()).unwrap_or(NOT_FOUND)
    }

    fn range_query(&self, low: K, high: K, _thread_id: usize) -> u64 {
        if low > high || self.len == 0 {
            return 0;
        }
        let high_bytes = high.to_be_bytes_vec();
        let mut sum = 0u64;
        for (key_bytes, value) in self.trie.move_to_key_greater_than(&low.to_be_bytes_vec(), true) {
            if key_bytes.as_slice() > high_bytes.as_slice() {
                break;
            }
            sum = sum.wrapping_add(value);
        }
        sum
    }

    fn name(&self) -> String {
        format!("fst(sparse_dense_ratio={})", self.sparse_dense_ratio)
    }

    fn size(&self) -> usize {
        self.trie.size_bytes()
    }

    fn applicable(&self, workload: Workload) -> bool {
        !workload.insert
    }
}
