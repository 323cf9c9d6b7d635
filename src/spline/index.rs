// TrieSpline accelerator: CHT-over-knots plus piecewise-linear interpolation.

use crate::bound::SearchBound;
use crate::cht::CompactHistTree;
use crate::key::IndexKey;
use crate::spline::builder::{build_knots, tune_cht, Knot};

/// A piecewise-linear spline over a sorted key array's CDF, accelerated by
/// a [`CompactHistTree`] over the spline's own knot keys.
pub struct SplineIndex<K: IndexKey> {
    knots: Vec<Knot<K>>,
    knot_keys: Vec<K>,
    cht: CompactHistTree<K>,
    max_error: u32,
    min_key: u64,
    max_key: u64,
    len: usize,
}

impl<K: IndexKey> SplineIndex<K> {
    pub fn build(keys: &[K], max_error: u32) -> Self {
        let knots = build_knots(keys, max_error);
        let knot_keys: Vec<K> = knots.iter().map(|k| k.key).collect();
        let cht = tune_cht(&knot_keys);

        let (min_key, max_key) = if keys.is_empty() {
            (0, 0)
        } else {
            (keys[0].as_u64(), keys[keys.len() - 1].as_u64())
        };

        Self { knots, knot_keys, cht, max_error, min_key, max_key, len: keys.len() }
    }

    pub fn size_bytes(&self) -> usize {
        self.cht.size_bytes()
            + self.knots.len() * std::mem::size_of::<Knot<K>>()
            + self.knot_keys.len() * std::mem::size_of::<K>()
    }

    /// Narrow a query key down to a `[begin, end)` bound, per the spline
    /// lookup procedure: clamp, narrow to a knot range via the CHT, locate
    /// the bracketing segment, interpolate, then widen by `±max_error`.
    pub fn search_bound(&self, key: K) -> SearchBound {
        if self.len == 0 || self.knots.is_empty() {
            return SearchBound::empty_at(0);
        }

        let k = key.as_u64().clamp(self.min_key, self.max_key);

        let knot_bound = self.cht.search_bound(K::from_u64(k));
        let seg_hi = if knot_bound.width() < 32 {
            self.knot_keys[knot_bound.begin..knot_bound.end]
                .iter()
                .position(|kn| kn.as_u64() >= k)
                .map(|p| p + knot_bound.begin)
                .unwrap_or(knot_bound.end)
        } else {
            knot_bound.begin
                + self.knot_keys[knot_bound.begin..knot_bound.end].partition_point(|kn| kn.as_u64() < k)
        };
        let seg_hi = seg_hi.clamp(1, self.knots.len() - 1);
        let lo = &self.knots[seg_hi - 1];
        let hi = &self.knots[seg_hi];

        let est = if hi.key.as_u64() == lo.key.as_u64() {
            lo.pos
        } else {
            let num = (k - lo.key.as_u64()) as u128 * (hi.pos - lo.pos) as u128;
            let den = (hi.key.as_u64() - lo.key.as_u64()) as u128;
            lo.pos + (num / den) as u64
        };

        let eps = self.max_error as u64;
        let begin = est.saturating_sub(eps) as usize;
        let end = (est + eps + 2) as usize;
        SearchBound::new(begin.min(self.len), end.min(self.len).max(begin.min(self.len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_three_bound_contains_true_position() {
        let mut keys: Vec<u64> = (0..1_000_000u64).map(|i| i * 2).collect();
        keys.push(424242);
        keys.sort_unstable();
        let idx = SplineIndex::build(&keys, 32);
        let true_pos = keys.partition_point(|&k| k < 424242);
        let bound = idx.search_bound(424242);
        assert!(bound.contains(true_pos), "bound {:?} does not contain true position {}", bound, true_pos);
    }

    #[test]
    fn error_bound_matches_two_eps_plus_two() {
        let keys: Vec<u32> = (0..20_000u32).map(|i| i * 3).collect();
        let max_error = 16u32;
        let idx = SplineIndex::build(&keys, max_error);
        for probe in (0..60_000u32).step_by(23) {
            let bound = idx.search_bound(probe);
            assert!(bound.width() <= 2 * max_error as usize + 2);
        }
    }

    #[test]
    fn empty_input_yields_empty_bound() {
        let keys: Vec<u32> = Vec::new();
        let idx = SplineIndex::build(&keys, 16);
        assert_eq!(idx.search_bound(10), SearchBound::empty_at(0));
    }
}
