use super::Searcher;
use crate::key::IndexKey;

/// Doubling-expansion ("galloping") search from a hint position.
///
/// Used when an estimator (CHT radix table, TrieSpline interpolation)
/// returns a probable position rather than a tight `[begin, end)` range:
/// the search brackets the key by stepping away from `hint` in powers of
/// two, then finishes with an ordinary binary search inside the bracket.
/// Unlike [`super::LinearSearch`] and [`super::BranchingBinarySearch`], the
/// `hint` argument is required, not advisory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialSearch;

#[inline]
fn binary_lower_bound<K: IndexKey>(keys: &[K], mut lo: usize, mut hi: usize, key: K) -> usize {
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if keys[mid] < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

impl<K: IndexKey> Searcher<K> for ExponentialSearch {
    fn lower_bound(&self, keys: &[K], begin: usize, end: usize, key: K, hint: usize) -> usize {
        if begin >= end {
            return begin;
        }
        let hint = hint.clamp(begin, end - 1);

        if keys[hint] >= key {
            // Bracket to the left of (and including) `hint`.
            let mut lo = hint;
            let mut step = 1usize;
            loop {
                if lo <= begin {
                    lo = begin;
                    break;
                }
                let probe = lo.saturating_sub(step).max(begin);
                if keys[probe] < key {
                    lo = probe;
                    break;
                }
                lo = probe;
                if probe == begin {
                    break;
                }
                step *= 2;
            }
            binary_lower_bound(keys, lo, hint + 1, key)
        } else {
            // Bracket to the right of `hint`.
            let mut hi = hint;
            let mut step = 1usize;
            loop {
                let probe = hi.saturating_add(step).min(end);
                if probe >= end || keys[probe] >= key {
                    hi = probe;
                    break;
                }
                hi = probe;
                step *= 2;
            }
            binary_lower_bound(keys, hint, hi, key)
        }
    }

    fn name(&self) -> &'static str {
        "exponential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_std_lower_bound_from_various_hints() {
        let keys: Vec<u64> = (0..2000).map(|i| i * 5).collect();
        for &probe in &[0u64, 13, 4997, 9999, 10000] {
            let expected = keys.partition_point(|&k| k < probe);
            for &hint in &[0usize, 10, 500, 999, 1999] {
                let got = ExponentialSearch.lower_bound(&keys, 0, keys.len(), probe, hint);
                assert_eq!(got, expected, "probe={probe} hint={hint}");
            }
        }
    }

    #[test]
    fn single_element_range() {
        let keys = [5u32];
        assert_eq!(ExponentialSearch.lower_bound(&keys, 0, 1, 5, 0), 0);
        assert_eq!(ExponentialSearch.lower_bound(&keys, 0, 1, 6, 0), 1);
        assert_eq!(ExponentialSearch.lower_bound(&keys, 0, 1, 4, 0), 0);
    }
}
