use super::Searcher;
use crate::key::IndexKey;

/// Scan forward from `begin`, stopping at the first element `>= key`.
///
/// Preferred when the expected range width is small (roughly `<= 32`
/// elements) since it has no branch mispredictions on the comparison
/// outcome and stays entirely within one or two cache lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSearch;

impl<K: IndexKey> Searcher<K> for LinearSearch {
    #[inline]
    fn lower_bound(&self, keys: &[K], begin: usize, end: usize, key: K, _hint: usize) -> usize {
        let mut i = begin;
        while i < end && keys[i] < key {
            i += 1;
        }
        i
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::check_lower_bound;

    #[test]
    fn matches_std_lower_bound() {
        let keys: Vec<u32> = (0..200).map(|i| i * 3).collect();
        let probes: Vec<u32> = (0..600).collect();
        check_lower_bound(&LinearSearch, &keys, &probes);
    }

    #[test]
    fn respects_begin_end() {
        let keys = [0u32, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        // Searching for 2 but restricted to [5, 10) should not find it before 5.
        assert_eq!(LinearSearch.lower_bound(&keys, 5, 10, 2, 0), 5);
    }
}
