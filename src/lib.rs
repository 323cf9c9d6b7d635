//! In-memory ordered-key index engines for read-mostly, sorted key arrays.
//!
//! Four accelerators narrow a query key down to a small `[begin, end)`
//! window over a sorted backing array, then hand off to a pluggable
//! final-mile [`search::Searcher`] to resolve the exact position:
//!
//! - [`cht`] -- Compact Hist-Tree, a bucketed radix accelerator.
//! - `spline` -- TrieSpline, a piecewise-linear CDF approximation over CHT.
//! - `fst` -- Fast Succinct Trie, a LOUDS-encoded byte-string map.
//! - `fast` -- an implicit, cache/SIMD-hierarchy binary search tree.
//!
//! Every engine implements the uniform [`engine::IndexEngine`] contract:
//! build once, single-threaded, then serve any number of concurrent
//! lock-free readers.

pub mod bound;
pub mod cht;
pub mod engine;
pub mod entry;
pub mod error;
pub mod fast;
pub mod fst;
pub mod key;
pub mod search;
pub mod spline;
pub mod utils;

pub use bound::SearchBound;
pub use cht::ChtIndex;
pub use engine::{IndexEngine, Workload, NOT_FOUND, OVERFLOW};
pub use entry::KeyValue;
pub use error::CoreError;
pub use fast::FastEngine;
pub use fst::FstEngine;
pub use key::IndexKey;
pub use spline::SplineEngine;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
