// IndexEngine wiring for the Compact Hist-Tree accelerator.

use std::marker::PhantomData;
use std::time::Instant;

use crate::cht::builder::{CompactHistTree, Params};
use crate::engine::{IndexEngine, Workload, NOT_FOUND, OVERFLOW};
use crate::entry::{first_disorder, KeyValue};
use crate::error::{CoreError, Result};
use crate::key::IndexKey;
use crate::search::{BranchingBinarySearch, Searcher};

/// CHT as a complete [`IndexEngine`]: the accelerator plus the sorted
/// backing array and a final-mile [`Searcher`].
pub struct ChtIndex<K: IndexKey, S: Searcher<K> = BranchingBinarySearch> {
    params: Params,
    data: Vec<KeyValue<K>>,
    keys: Vec<K>,
    tree: CompactHistTree<K>,
    searcher: S,
    _marker: PhantomData<K>,
}

impl<K: IndexKey, S: Searcher<K> + Default> ChtIndex<K, S> {
    /// Validate `params` and return an unbuilt engine.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnsupportedConfiguration`] if `num_bins` isn't a power
    /// of two, or if `single_pass && cache_oblivious` (that combination is
    /// rejected outright rather than silently picking one).
    pub fn new(params: Params) -> Result<Self> {
        if !params.num_bins.is_power_of_two() {
            return Err(CoreError::UnsupportedConfiguration {
                reason: format!("num_bins {} is not a power of two", params.num_bins),
            });
        }
        if params.single_pass && params.cache_oblivious {
            return Err(CoreError::UnsupportedConfiguration {
                reason: "single_pass and cache_oblivious cannot both be set".into(),
            });
        }
        Ok(Self {
            params,
            data: Vec::new(),
            keys: Vec::new(),
            tree: CompactHistTree::build(&[] as &[K], &params),
            searcher: S::default(),
            _marker: PhantomData,
        })
    }
}

impl<K: IndexKey, S: Searcher<K>> IndexEngine<K> for ChtIndex<K, S> {
    fn build(&mut self, sorted_data: &[KeyValue<K>], num_threads: usize) -> u128 {
        debug_assert_eq!(num_threads, 1, "CHT build is single-threaded only");
        debug_assert!(first_disorder(sorted_data).is_none(), "build input must be sorted");

        let start = Instant::now();
        self.keys = sorted_data.iter().map(|kv| kv.key).collect();
        self.tree = CompactHistTree::build(&self.keys, &self.params);
        self.data = sorted_data.to_vec();
        start.elapsed().as_nanos()
    }

    fn equality_lookup(&self, key: K, _thread_id: usize) -> u64 {
        if self.data.is_empty() {
            return OVERFLOW;
        }
        let bound = self.tree.search_bound(key);
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
        let bound = self.tree.search_bound(low);
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
        format!(
            "cht(num_bins={},max_error={},single_pass={},cache_oblivious={})",
            self.params.num_bins, self.params.max_error, self.params.single_pass, self.params.cache_oblivious
        )
    }

    fn size(&self) -> usize {
        self.tree.size_bytes() + self.data.len() * std::mem::size_of::<KeyValue<K>>()
    }

    fn variants(&self) -> Vec<String> {
        vec!["two_pass".into(), "single_pass".into(), "cache_oblivious".into()]
    }

    fn applicable(&self, workload: Workload) -> bool {
        !workload.insert
    }
}
