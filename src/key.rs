// Key types accepted by the index engines.
//
// CHT, TrieSpline and FAST operate on fixed-width unsigned integers and need
// arithmetic on them (subtraction, shifting, interpolation); FST operates on
// byte strings and gets its integer-key support through the big-endian
// adaptor below, the only portable way to make lexicographic order agree
// with numeric order.

use std::fmt::Debug;

/// Trait implemented by the fixed-width unsigned integer types the core
/// engines index directly (`u32`, `u64`).
///
/// This is not a generic "any orderable type" abstraction -- the four core
/// engines all need a `u64` arithmetic projection (for CHT bin math, spline
/// interpolation, FAST padding) and a big-endian byte encoding (for the FST
/// adaptor), so the trait bakes both in rather than introducing a separate
/// `KeyEncoder` layer for a key space this narrow.
pub trait IndexKey: Copy + Ord + Eq + Debug + Send + Sync + 'static {
    /// Size of the encoded key in bytes.
    const ENCODED_SIZE: usize;

    /// Sentinel used to pad FAST's implicit tree past the real key count so
    /// that unsigned compares behave as +infinity.
    const MAX: Self;

    /// Widen to `u64` for bin-width and interpolation arithmetic. Lossless
    /// for both `u32` and `u64`.
    fn as_u64(self) -> u64;

    /// Narrow back from the `u64` projection.
    fn from_u64(value: u64) -> Self;

    /// Big-endian bytes, used by the FST integer-key adaptor so that
    /// lexicographic order over the bytes equals numeric order.
    fn to_be_bytes_vec(self) -> Vec<u8>;
}

impl IndexKey for u32 {
    const ENCODED_SIZE: usize = 4;
    const MAX: Self = u32::MAX;

    #[inline]
    fn as_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value as u32
    }

    #[inline]
    fn to_be_bytes_vec(self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl IndexKey for u64 {
    const ENCODED_SIZE: usize = 8;
    const MAX: Self = u64::MAX;

    #[inline]
    fn as_u64(self) -> u64 {
        self
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value
    }

    #[inline]
    fn to_be_bytes_vec(self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_round_trips_through_u64() {
        let k: u32 = 424_242;
        assert_eq!(u32::from_u64(k.as_u64()), k);
    }

    #[test]
    fn be_bytes_preserve_numeric_order() {
        let mut keys = vec![3u32, 9_000_000, 1, 42, u32::MAX, 0];
        let mut encoded: Vec<Vec<u8>> = keys.iter().map(|k| k.to_be_bytes_vec()).collect();
        keys.sort();
        encoded.sort();
        let decoded_order: Vec<u32> = encoded
            .iter()
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(decoded_order, keys);
    }

    #[test]
    fn u64_be_bytes_preserve_numeric_order() {
        let keys = vec![3u64, 9_000_000_000, 1, 42, u64::MAX, 0];
        let mut encoded: Vec<Vec<u8>> = keys.iter().map(|k| k.to_be_bytes_vec()).collect();
        let mut sorted_keys = keys.clone();
        sorted_keys.sort();
        encoded.sort();
        assert_eq!(
            encoded,
            sorted_keys.iter().map(|k| k.to_be_bytes_vec()).collect::<Vec<_>>()
        );
    }
}
