use super::Searcher;
use crate::key::IndexKey;

/// Linear interpolation on key values to guess the next probe position,
/// falling back to ordinary binary narrowing whenever the local key
/// distribution can't support a useful interpolation guess (a flat run of
/// equal keys, or a range of width one).
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolationSearch;

impl<K: IndexKey> Searcher<K> for InterpolationSearch {
    fn lower_bound(&self, keys: &[K], begin: usize, end: usize, key: K, _hint: usize) -> usize {
        let mut lo = begin;
        let mut hi = end;

        while lo < hi {
            if keys[lo] >= key {
                return lo;
            }
            let last = hi - 1;
            if keys[last] < key {
                return hi;
            }
            if last == lo {
                return if keys[lo] < key { hi } else { lo };
            }

            let span_key = keys[last].as_u64() - keys[lo].as_u64();
            let probe = if span_key == 0 {
                // Flat run of equal keys: no information to interpolate on.
                lo + (hi - lo) / 2
            } else {
                let numerator = (key.as_u64() - keys[lo].as_u64()) as u128 * (last - lo) as u128;
                let offset = (numerator / span_key as u128) as usize;
                (lo + offset).clamp(lo, last)
            };

            if keys[probe] < key {
                lo = probe + 1;
            } else {
                hi = probe;
            }
        }
        lo
    }

    fn name(&self) -> &'static str {
        "interpolation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::check_lower_bound;

    #[test]
    fn matches_std_lower_bound_uniform() {
        let keys: Vec<u64> = (0..10_000).map(|i| i * 97).collect();
        let probes: Vec<u64> = (0..20_000).step_by(37).collect();
        check_lower_bound(&InterpolationSearch, &keys, &probes);
    }

    #[test]
    fn handles_runs_of_duplicates() {
        let mut keys = vec![1u32; 50];
        keys.extend(std::iter::repeat(2u32).take(50));
        keys.extend(std::iter::repeat(3u32).take(50));
        check_lower_bound(&InterpolationSearch, &keys, &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn handles_single_element() {
        let keys = [10u32];
        assert_eq!(InterpolationSearch.lower_bound(&keys, 0, 1, 10, 0), 0);
        assert_eq!(InterpolationSearch.lower_bound(&keys, 0, 1, 11, 0), 1);
    }
}
