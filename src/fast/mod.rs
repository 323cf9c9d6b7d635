//! FAST: an implicit, complete binary search tree laid out in
//! page/cache-line/SIMD-sized blocks inside huge-page memory.

mod backing;
mod engine;
mod layout;
mod tree;

pub use engine::FastEngine;
