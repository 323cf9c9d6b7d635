// Incremental LOUDS-trie stream construction from a sorted byte-key list.
//
// Builds per-level label/has_child/louds/node_is_key streams by walking
// sorted keys and tracking the longest common prefix with the previous
// key, exactly as the source's incremental trie builder does. Departs
// from a reserved terminator-byte convention for "this node is also a
// complete key": raw big-endian integer keys can legitimately contain a
// zero byte, so no byte value is safe to reserve. Instead each node
// carries its own `node_is_key` bit, mirroring the dense tier's
// "prefix-key bit" uniformly at every level rather than only the top one.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct RawLevel {
    pub labels: Vec<u8>,
    pub has_child: Vec<bool>,
    pub louds: Vec<bool>,
    pub node_is_key: Vec<bool>,
}

pub(crate) struct RawTrie {
    pub levels: Vec<RawLevel>,
    pub leaf_values: HashMap<(usize, usize), u64>,
    pub prefix_values: HashMap<(usize, usize), u64>,
    pub root_is_key: bool,
    pub root_value: u64,
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Build the raw per-level trie streams from `keys` (sorted, unique) and
/// their parallel `values`.
pub(crate) fn build_raw_trie(keys: &[Vec<u8>], values: &[u64]) -> RawTrie {
    let mut levels: Vec<RawLevel> = Vec::new();
    let mut leaf_values: HashMap<(usize, usize), u64> = HashMap::new();
    let mut prefix_values: HashMap<(usize, usize), u64> = HashMap::new();
    let mut root_is_key = false;
    let mut root_value = 0u64;

    let mut prev_bytes: Option<Vec<u8>> = None;
    let mut prev_value: u64 = 0;
    // path_positions[level] = index within levels[level]'s arrays of the
    // previous key's label at that level.
    let mut prev_positions: Vec<usize> = Vec::new();

    for (key, &value) in keys.iter().zip(values.iter()) {
        let lcp = match &prev_bytes {
            Some(p) => common_prefix_len(p, key),
            None => 0,
        };

        let mut pending_prefix_value: Option<u64> = None;
        if let Some(p) = &prev_bytes {
            if lcp == p.len() && lcp < key.len() {
                if p.is_empty() {
                    root_is_key = true;
                    root_value = prev_value;
                } else {
                    let (plevel, pidx) = (lcp - 1, prev_positions[lcp - 1]);
                    debug_assert!(!levels[plevel].has_child[pidx]);
                    levels[plevel].has_child[pidx] = true;
                    leaf_values.remove(&(plevel, pidx));
                    pending_prefix_value = Some(prev_value);
                }
            } else if lcp == p.len() && lcp == key.len() {
                // Exact duplicate key: not a valid map input.
                debug_assert!(false, "FST build requires unique keys");
            }
        }

        let mut current_positions = prev_positions[..lcp.min(prev_positions.len())].to_vec();

        for level in lcp..key.len() {
            if levels.len() <= level {
                levels.push(RawLevel::default());
            }
            let is_new_node = if level > lcp {
                true
            } else if lcp == 0 {
                levels[0].labels.is_empty()
            } else {
                prev_bytes.as_ref().map(|p| p.len() == lcp).unwrap_or(false)
            };

            let idx = levels[level].labels.len();
            levels[level].labels.push(key[level]);
            let is_last = level == key.len() - 1;
            levels[level].has_child.push(!is_last);
            levels[level].louds.push(is_new_node);

            if is_new_node {
                let node_index = levels[level].node_is_key.len();
                if level == lcp {
                    if let Some(v) = pending_prefix_value.take() {
                        levels[level].node_is_key.push(true);
                        prefix_values.insert((level, node_index), v);
                    } else {
                        levels[level].node_is_key.push(false);
                    }
                } else {
                    levels[level].node_is_key.push(false);
                }
            }

            if is_last {
                leaf_values.insert((level, idx), value);
            }
            current_positions.push(idx);
        }

        prev_bytes = Some(key.clone());
        prev_value = value;
        prev_positions = current_positions;
    }

    RawTrie { levels, leaf_values, prefix_values, root_is_key, root_value }
}

/// Choose the dense/sparse split level: include a level in the dense tier
/// while its fixed 256-bit-per-node cost isn't more than `sparse_dense_ratio`
/// times the label count of everything from that level onward (a direct,
/// bounded stand-in for the source's exhaustive per-level cost sweep).
pub(crate) fn choose_split_level(levels: &[RawLevel], sparse_dense_ratio: u32) -> usize {
    let mut suffix_labels = vec![0u64; levels.len() + 1];
    for l in (0..levels.len()).rev() {
        suffix_labels[l] = suffix_labels[l + 1] + levels[l].labels.len() as u64;
    }

    let mut split = 0usize;
    for (l, level) in levels.iter().enumerate() {
        let node_count = level.node_is_key.len() as u64;
        let dense_cost = node_count * 256;
        let sparse_cost = suffix_labels[l] * sparse_dense_ratio as u64;
        if dense_cost <= sparse_cost.max(1) {
            split = l + 1;
        } else {
            break;
        }
    }
    split
}
