// Error types for the index engines.
//
// Every engine validates its build-time contract (sorted input, keys inside
// the declared range, supported parameter combinations) at the `Builder`
// boundary. None of these variants are ever produced on the lookup path --
// a finalised index cannot fail to answer a query, it can only return a
// sentinel (see `engine::NOT_FOUND` / `engine::OVERFLOW`).

use thiserror::Error;

/// Error type for index construction failures.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("key at position {index} is out of order relative to its predecessor")]
    UnsortedInput { index: usize },

    #[error("key {key} is outside the declared range [{min}, {max}]")]
    KeyOutOfRange {
        key: String,
        min: String,
        max: String,
    },

    #[error("unsupported configuration: {reason}")]
    UnsupportedConfiguration { reason: String },

    #[error("failed to allocate {requested_bytes} bytes for index storage")]
    AllocationFailed { requested_bytes: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
