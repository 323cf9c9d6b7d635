// Sparse tier: remaining trie levels flattened into one LOUDS-encoded
// stream, node boundaries located via `select` over the LOUDS bitmap.

use std::collections::HashMap;

use crate::fst::bitvector::{BitVector, RankSelect};
use crate::fst::builder::RawLevel;

pub(crate) struct SparseTier {
    labels: Vec<u8>,
    has_child: BitVector,
    louds: BitVector,
    node_is_key: BitVector,
    leaf_values: Vec<u64>,
    prefix_values: Vec<u64>,
    pub node_count: usize,
}

pub(crate) enum SparseStep {
    Absent,
    Value(u64),
    Child(usize),
}

impl SparseTier {
    pub fn empty() -> Self {
        Self {
            labels: Vec::new(),
            has_child: BitVector::from_bits(&[]),
            louds: BitVector::from_bits(&[]),
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
        if split_level >= levels.len() {
            return Self::empty();
        }

        let mut labels = Vec::new();
        let mut has_child_bits = Vec::new();
        let mut louds_bits = Vec::new();
        let mut node_is_key_bits = Vec::new();
        let mut leaf_value_by_pos: HashMap<usize, u64> = HashMap::new();
        let mut prefix_values = Vec::new();

        for l in split_level..levels.len() {
            let level = &levels[l];
            let label_base = labels.len();
            for (pos, &label) in level.labels.iter().enumerate() {
                labels.push(label);
                has_child_bits.push(level.has_child[pos]);
                louds_bits.push(level.louds[pos]);
                if !level.has_child[pos] {
                    if let Some(&v) = leaf_values_map.get(&(l, pos)) {
                        leaf_value_by_pos.insert(label_base + pos, v);
                    }
                }
            }
            for (local_idx, &is_key) in level.node_is_key.iter().enumerate() {
                node_is_key_bits.push(is_key);
                if is_key {
                    prefix_values.push(prefix_values_map[&(l, local_idx)]);
                }
            }
        }

        let mut positions: Vec<usize> = leaf_value_by_pos.keys().copied().collect();
        positions.sort_unstable();
        let leaf_values = positions.iter().map(|p| leaf_value_by_pos[p]).collect();

        let node_count = node_is_key_bits.len();
        Self {
            labels,
            has_child: BitVector::from_bits(&has_child_bits),
            louds: BitVector::from_bits(&louds_bits),
            node_is_key: BitVector::from_bits(&node_is_key_bits),
            leaf_values,
            prefix_values,
            node_count,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.labels.len()
            + self.has_child.size_bytes()
            + self.louds.size_bytes()
            + self.node_is_key.size_bytes()
            + self.leaf_values.len() * 8
            + self.prefix_values.len() * 8
    }

    pub fn node_value(&self, node: usize) -> Option<u64> {
        if self.node_is_key.bit(node) {
            let idx = self.node_is_key.rank1(node + 1) - 1;
            Some(self.prefix_values[idx])
        } else {
            None
        }
    }

    fn node_range(&self, node: usize) -> (usize, usize) {
        let begin = self.louds.select1(node);
        let end = if node + 1 < self.node_count { self.louds.select1(node + 1) } else { self.labels.len() };
        (begin, end)
    }

    /// Public span of label positions `[begin, end)` belonging to `node`.
    pub fn node_span(&self, node: usize) -> (usize, usize) {
        self.node_range(node)
    }

    pub fn step(&self, node: usize, label: u8) -> SparseStep {
        let (begin, end) = self.node_range(node);
        for pos in begin..end {
            if self.labels[pos] == label {
                if !self.has_child.bit(pos) {
                    let idx = pos - self.has_child.rank1(pos);
                    return SparseStep::Value(self.leaf_values[idx]);
                }
                let child = self.has_child.rank1(pos + 1);
                return SparseStep::Child(child);
            }
        }
        SparseStep::Absent
    }

    /// First label position at `node` whose byte is `>= label` (used by the
    /// range-scan iterator to jump past a mismatch instead of failing).
    pub fn first_label_at_least(&self, node: usize, label: u8) -> Option<usize> {
        let (begin, end) = self.node_range(node);
        (begin..end).find(|&pos| self.labels[pos] >= label)
    }

    pub fn label_at(&self, pos: usize) -> u8 {
        self.labels[pos]
    }

    pub fn has_child_at(&self, pos: usize) -> bool {
        self.has_child.bit(pos)
    }

    pub fn child_of(&self, pos: usize) -> usize {
        self.has_child.rank1(pos + 1)
    }

    pub fn value_at(&self, pos: usize) -> u64 {
        let idx = pos - self.has_child.rank1(pos);
        self.leaf_values[idx]
    }

    pub fn node_of(&self, pos: usize) -> usize {
        self.louds.rank1(pos + 1) - 1
    }

    pub fn node_end(&self, node: usize) -> usize {
        self.node_range(node).1
    }
}
