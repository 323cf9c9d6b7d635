// Dense tier: top trie levels stored as fixed 256-bit label/child bitmaps
// per node, giving O(1) descent without rank/select over variable-width
// node arrays.

use std::collections::HashMap;

use crate::fst::bitvector::{BitVector, RankSelect};
use crate::fst::builder::RawLevel;

pub(crate) struct DenseTier {
    level_offset: Vec<usize>,
    label_bitmap: BitVector,
    child_bitmap: BitVector,
    node_is_key: BitVector,
    leaf_values: Vec<u64>,
    prefix_values: Vec<u64>,
    pub node_count: usize,
}

/// Outcome of probing one label byte at one dense node.
pub(crate) enum DenseStep {
    Absent,
    Value(u64),
    Child(usize),
}

impl DenseTier {
    pub fn empty() -> Self {
        Self {
            level_offset: vec![0],
            label_bitmap: BitVector::from_bits(&[]),
            child_bitmap: BitVector::from_bits(&[]),
            node_is_key: BitVector::from_bits(&[]),
            leaf_values: Vec::new(),
            prefix_values: Vec::new(),
            node_count: 0,
        }
    }

    pub fn build(
        levels: &[RawLevel],
        split_level: usize,
        leaf_values_map: &HashMap<(usize, usize), u64>,
        prefix_values_map: &HashMap<(usize, usize), u64>,
    ) -> Self {
        if split_level == 0 {
            return Self::empty();
        }

        let mut level_offset = vec![0usize; split_level + 1];
        for l in 0..split_level {
            level_offset[l + 1] = level_offset[l] + levels[l].node_is_key.len();
        }
        let node_count = level_offset[split_level];

        let mut label_bits = vec![false; node_count * 256];
        let mut child_bits = vec![false; node_count * 256];
        let mut node_is_key_bits = vec![false; node_count];
        let mut leaf_value_by_pos: HashMap<usize, u64> = HashMap::new();

        for l in 0..split_level {
            let level = &levels[l];
            let mut node_idx: isize = -1;
            for (pos, &label) in level.labels.iter().enumerate() {
                if level.louds[pos] {
                    node_idx += 1;
                }
                let global_id = level_offset[l] + node_idx as usize;
                let bit_pos = global_id * 256 + label as usize;
                label_bits[bit_pos] = true;
                if level.has_child[pos] {
                    // The child's global id is recovered at lookup time via
                    // `rank1(child_bitmap, pos + 1)`, which continues past
                    // `node_count` into sparse node ids -- no need to
                    // precompute it here.
                    child_bits[bit_pos] = true;
                } else if let Some(&v) = leaf_values_map.get(&(l, pos)) {
                    leaf_value_by_pos.insert(bit_pos, v);
                }
            }
            for (local_idx, &is_key) in level.node_is_key.iter().enumerate() {
                node_is_key_bits[level_offset[l] + local_idx] = is_key;
            }
        }

        let mut leaf_values = Vec::new();
        let mut sorted_positions: Vec<usize> = leaf_value_by_pos.keys().copied().collect();
        sorted_positions.sort_unstable();
        for pos in sorted_positions {
            leaf_values.push(leaf_value_by_pos[&pos]);
        }

        let mut prefix_values = Vec::new();
        for l in 0..split_level {
            for (local_idx, &is_key) in levels[l].node_is_key.iter().enumerate() {
                if is_key {
                    prefix_values.push(prefix_values_map[&(l, local_idx)]);
                }
            }
        }

        Self {
            level_offset,
            label_bitmap: BitVector::from_bits(&label_bits),
            child_bitmap: BitVector::from_bits(&child_bits),
            node_is_key: BitVector::from_bits(&node_is_key_bits),
            leaf_values,
            prefix_values,
            node_count,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.label_bitmap.size_bytes()
            + self.child_bitmap.size_bytes()
            + self.node_is_key.size_bytes()
            + self.leaf_values.len() * 8
            + self.prefix_values.len() * 8
    }

    /// Value stored at this node's own completion (prefix-key bit), if any.
    pub fn node_value(&self, node: usize) -> Option<u64> {
        if self.node_is_key.bit(node) {
            let idx = self.node_is_key.rank1(node + 1) - 1;
            Some(self.prefix_values[idx])
        } else {
            None
        }
    }

    /// Probe `label` at `node`. The returned child id, if any, is a
    /// *global* id spanning dense node ids `[0, node_count)` followed by
    /// sparse node ids continuing from `node_count`.
    pub fn step(&self, node: usize, label: u8) -> DenseStep {
        let pos = node * 256 + label as usize;
        if !self.label_bitmap.bit(pos) {
            return DenseStep::Absent;
        }
        if !self.child_bitmap.bit(pos) {
            let idx = self.label_bitmap.rank1(pos + 1) - self.child_bitmap.rank1(pos + 1) - 1;
            return DenseStep::Value(self.leaf_values[idx]);
        }
        let global_child = self.child_bitmap.rank1(pos + 1);
        DenseStep::Child(global_child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fst::builder::build_raw_trie;

    #[test]
    fn flat_two_key_trie_resolves_both_values() {
        let keys = vec![vec![1u8, 2], vec![1u8, 3]];
        let values = vec![10u64, 20u64];
        let raw = build_raw_trie(&keys, &values);
        let dense = DenseTier::build(&raw.levels, raw.levels.len(), &raw.leaf_values, &raw.prefix_values);

        match dense.step(0, 1) {
            DenseStep::Child(child) => {
                assert!(matches!(dense.step(child, 2), DenseStep::Value(10)));
                assert!(matches!(dense.step(child, 3), DenseStep::Value(20)));
            }
            _ => panic!("expected a child node at label 1"),
        }
        assert!(matches!(dense.step(0, 9), DenseStep::Absent));
    }
}
