// KeyValue: the canonical backing record for every index engine.
//
// Named after the teacher's `bst::sorted_index::KeyValue<T>`, collapsed to a
// single `u64` payload per the distilled contract (one position, not a list
// of duplicate offsets).

use crate::key::IndexKey;

/// A key paired with an opaque payload, typically the key's position in the
/// caller's source array.
///
/// The sorted slice of `KeyValue<K>` is the canonical backing data; every
/// engine's index maps a query key to a position in this slice, not to the
/// payload directly (FST is the one exception: it stores the payload inline
/// in its value arrays since it already walks a trie keyed on raw bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValue<K: IndexKey> {
    pub key: K,
    pub payload: u64,
}

impl<K: IndexKey> KeyValue<K> {
    pub fn new(key: K, payload: u64) -> Self {
        Self { key, payload }
    }
}

/// Checks that `data` is sorted in non-decreasing key order, as every
/// `Builder::build` entry point requires.
///
/// Returns the index of the first out-of-order key, if any.
pub fn first_disorder<K: IndexKey>(data: &[KeyValue<K>]) -> Option<usize> {
    data.windows(2).position(|w| w[0].key > w[1].key).map(|i| i + 1)
}
