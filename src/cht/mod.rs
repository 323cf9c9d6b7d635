//! Compact Hist-Tree: a bucketed radix accelerator over a sorted key array.
//!
//! Every internal node partitions its covered key range into `num_bins`
//! equal-width bins; a bin is either a leaf (a starting position in the
//! backing array) or a pointer to a child node, tagged via [`slot::Slot`].

mod builder;
mod engine;
mod slot;

pub use builder::{CompactHistTree, Params};
pub use engine::ChtIndex;
