// Implicit complete binary search tree, laid out in page/cache-line/SIMD
// sized blocks so each level of the memory hierarchy is walked
// breadth-first within its own block.

use crate::fast::backing::HugePageBuffer;
use crate::fast::layout::{depth_for_len, in_order_positions, region_size, Layout};
use crate::key::IndexKey;

const NOT_FOUND_INDEX: u32 = u32::MAX;

pub(crate) struct FastTree<K: IndexKey> {
    keys: HugePageBuffer<K>,
    orig_index: Vec<u32>,
    total_depth: usize,
    layout: Layout,
    len: usize,
}

/// Recursive in-order split of `a[lo..hi]` into a `depth_left`-deep top
/// structure (written into `top_out`/`top_idx` at `local` BFS positions)
/// plus the `2^depth_left` leftover leaf ranges, left to right.
fn build_top_d<K: IndexKey>(
    a: &[K],
    lo: usize,
    hi: usize,
    depth_left: usize,
    local: usize,
    top_out: &mut [K],
    top_idx: &mut [u32],
    leaves: &mut Vec<(usize, usize)>,
) {
    if depth_left == 0 {
        leaves.push((lo, hi));
        return;
    }
    let mid = lo + (hi - lo) / 2;
    build_top_d(a, lo, mid, depth_left - 1, 2 * local + 1, top_out, top_idx, leaves);
    top_out[local] = a[mid];
    top_idx[local] = mid as u32;
    build_top_d(a, mid + 1, hi, depth_left - 1, 2 * local + 2, top_out, top_idx, leaves);
}

/// Build one region of `span_depth` levels, nested internally in
/// `granularity`-sized blocks, writing into `out_keys`/`out_idx` starting
/// at `base`. Returns the `2^span_depth` leaf ranges of `a`, left to right.
fn build_span<K: IndexKey>(
    a: &[K],
    base: usize,
    span_depth: usize,
    granularity: usize,
    out_keys: &mut [K],
    out_idx: &mut [u32],
) -> Vec<(usize, usize)> {
    if span_depth == 0 {
        return vec![(0, a.len())];
    }
    let g = granularity.min(span_depth);
    let block_nodes = region_size(g);
    let mut leaves = Vec::new();
    build_top_d(a, 0, a.len(), g, 0, &mut out_keys[base..base + block_nodes], &mut out_idx[base..base + block_nodes], &mut leaves);

    if span_depth == g {
        return leaves;
    }

    let child_span_depth = span_depth - g;
    let child_region_len = region_size(child_span_depth);
    let mut all_leaves = Vec::with_capacity(leaves.len() * (1 << child_span_depth));
    let mut child_base = base + block_nodes;
    for &(lo, hi) in &leaves {
        let sub = &a[lo..hi];
        debug_assert_eq!(sub.len(), child_region_len);
        let sub_leaves = build_span(sub, child_base, child_span_depth, granularity, out_keys, out_idx);
        for (slo, shi) in sub_leaves {
            all_leaves.push((lo + slo, lo + shi));
        }
        child_base += child_region_len;
    }
    all_leaves
}

/// Build the whole tree: repeated cache-line-sized regions, each nested
/// internally in SIMD-sized blocks.
fn build_tree<K: IndexKey>(
    a: &[K],
    base: usize,
    total_depth: usize,
    layout: &Layout,
    out_keys: &mut [K],
    out_idx: &mut [u32],
) {
    if total_depth == 0 {
        return;
    }
    let c = layout.cacheline_levels.min(total_depth);
    let leaves = build_span(a, base, c, layout.simd_levels, out_keys, out_idx);
    let consumed = region_size(c);
    if total_depth > c {
        let child_depth = total_depth - c;
        let child_len = region_size(child_depth);
        let mut child_base = base + consumed;
        for (lo, hi) in leaves {
            let sub = &a[lo..hi];
            debug_assert_eq!(sub.len(), child_len);
            build_tree(sub, child_base, child_depth, layout, out_keys, out_idx);
            child_base += child_len;
        }
    }
}

impl<K: IndexKey> FastTree<K> {
    pub fn build(sorted_keys: &[K]) -> Self {
        let layout = Layout::for_key_size(K::ENCODED_SIZE);
        let len = sorted_keys.len();
        let total_depth = depth_for_len(len);
        let padded_len = region_size(total_depth);

        let mut padded: Vec<K> = Vec::with_capacity(padded_len);
        padded.extend_from_slice(sorted_keys);
        padded.resize(padded_len, K::MAX);

        let mut keys = HugePageBuffer::<K>::new(padded_len, K::MAX);
        let mut orig_index = vec![NOT_FOUND_INDEX; padded_len];
        build_tree(&padded, 0, total_depth, &layout, &mut keys, &mut orig_index);

        Self { keys, orig_index, total_depth, layout, len }
    }

    pub fn size_bytes(&self) -> usize {
        self.keys.len() * std::mem::size_of::<K>() + self.orig_index.len() * 4
    }

    /// Position of the first key `>= query`, or `len()` if none exists.
    pub fn lower_bound(&self, query: K) -> usize {
        if self.total_depth == 0 {
            return 0;
        }
        let mut best: u32 = self.len as u32;
        let mut region_base = 0usize;
        let mut region_depth_remaining = self.total_depth;

        while region_depth_remaining > 0 {
            let c = self.layout.cacheline_levels.min(region_depth_remaining);
            let leaf = self.descend_span(region_base, c, self.layout.simd_levels, query, &mut best);
            let consumed = region_size(c);
            region_depth_remaining -= c;
            let child_len = region_size(region_depth_remaining);
            region_base += consumed + leaf * child_len;
        }
        best as usize
    }

    /// Walk one cache-line-sized region (nested SIMD blocks), updating
    /// `best` at every block boundary crossed. Returns this region's leaf
    /// index in `[0, 2^span_depth)`, combined from its nested sub-blocks.
    fn descend_span(&self, base: usize, span_depth: usize, granularity: usize, query: K, best: &mut u32) -> usize {
        let g = granularity.min(span_depth);
        let block_nodes = region_size(g);
        let local_leaf = self.probe_block(base, g, query, best);

        if span_depth == g {
            return local_leaf;
        }

        let child_span_depth = span_depth - g;
        let child_region_len = region_size(child_span_depth);
        let inner_base = base + block_nodes + local_leaf * child_region_len;
        let child_leaf = self.descend_span(inner_base, child_span_depth, granularity, query, best);
        (local_leaf << child_span_depth) | child_leaf
    }

    /// Probe a single `g`-deep block at `base`: counts keys the query is
    /// strictly greater than (the SIMD popcount trick's scalar
    /// equivalent), updates `best` from the in-order boundary crossed, and
    /// returns the leaf index in `[0, 2^g)`.
    fn probe_block(&self, base: usize, g: usize, query: K, best: &mut u32) -> usize {
        let block_nodes = region_size(g);
        let mut greater_count = 0usize;
        for i in 0..block_nodes {
            if query > self.keys[base + i] {
                greater_count += 1;
            }
        }
        let leaf = greater_count;
        if leaf < block_nodes {
            let order = in_order_positions(g);
            let boundary_local = order[leaf];
            *best = self.orig_index[base + boundary_local];
        }
        leaf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bound_matches_std_binary_search_u64() {
        let keys: Vec<u64> = (0..2000u64).map(|i| i * 3).collect();
        let tree = FastTree::build(&keys);
        for probe in (0..6000u64).step_by(7) {
            let expected = keys.partition_point(|&k| k < probe);
            assert_eq!(tree.lower_bound(probe), expected, "mismatch at probe {probe}");
        }
    }

    #[test]
    fn lower_bound_matches_std_binary_search_u32() {
        let keys: Vec<u32> = (0..777u32).map(|i| i * 5).collect();
        let tree = FastTree::build(&keys);
        for probe in (0..4000u32).step_by(3) {
            let expected = keys.partition_point(|&k| k < probe);
            assert_eq!(tree.lower_bound(probe), expected, "mismatch at probe {probe}");
        }
    }

    #[test]
    fn empty_tree_lower_bound_is_zero() {
        let keys: Vec<u64> = Vec::new();
        let tree = FastTree::build(&keys);
        assert_eq!(tree.lower_bound(10), 0);
    }

    #[test]
    fn single_key_tree() {
        let keys = vec![42u64];
        let tree = FastTree::build(&keys);
        assert_eq!(tree.lower_bound(0), 0);
        assert_eq!(tree.lower_bound(42), 0);
        assert_eq!(tree.lower_bound(43), 1);
    }
}
