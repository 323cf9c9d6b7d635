use super::linear::LinearSearch;
use super::Searcher;

/// SIMD-vectorised linear search.
///
/// Compares eight `u32` lanes (or four `u64` lanes) at a time against a
/// broadcast key using an unsigned compare-greater-than, and returns the
/// lane index of the first element `>= key`. Falls back to
/// [`LinearSearch`]'s scalar loop on any target without AVX2 at runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearAvx;

impl Searcher<u32> for LinearAvx {
    fn lower_bound(&self, keys: &[u32], begin: usize, end: usize, key: u32, hint: usize) -> usize {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                // Safety: guarded by the runtime feature check above.
                return unsafe { lower_bound_avx2_u32(keys, begin, end, key) };
            }
        }
        LinearSearch.lower_bound(keys, begin, end, key, hint)
    }

    fn name(&self) -> &'static str {
        "linear_avx"
    }
}

impl Searcher<u64> for LinearAvx {
    fn lower_bound(&self, keys: &[u64], begin: usize, end: usize, key: u64, hint: usize) -> usize {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                // Safety: guarded by the runtime feature check above.
                return unsafe { lower_bound_avx2_u64(keys, begin, end, key) };
            }
        }
        LinearSearch.lower_bound(keys, begin, end, key, hint)
    }

    fn name(&self) -> &'static str {
        "linear_avx"
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn lower_bound_avx2_u32(keys: &[u32], begin: usize, end: usize, key: u32) -> usize {
    use std::arch::x86_64::*;

    let bias = _mm256_set1_epi32(i32::MIN);
    let key_biased = _mm256_xor_si256(_mm256_set1_epi32(key as i32), bias);

    let mut i = begin;
    while i + 8 <= end {
        let chunk = _mm256_loadu_si256(keys.as_ptr().add(i) as *const __m256i);
        let chunk_biased = _mm256_xor_si256(chunk, bias);
        // `gt` lane is all-ones iff key > keys[lane], i.e. keys[lane] < key.
        let gt = _mm256_cmpgt_epi32(key_biased, chunk_biased);
        let mask = _mm256_movemask_epi8(gt) as u32;
        if mask != u32::MAX {
            for lane in 0..8 {
                let nibble = (mask >> (lane * 4)) & 0xF;
                if nibble != 0xF {
                    return i + lane;
                }
            }
        }
        i += 8;
    }
    while i < end && keys[i] < key {
        i += 1;
    }
    i
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn lower_bound_avx2_u64(keys: &[u64], begin: usize, end: usize, key: u64) -> usize {
    use std::arch::x86_64::*;

    let bias = _mm256_set1_epi64x(i64::MIN);
    let key_biased = _mm256_xor_si256(_mm256_set1_epi64x(key as i64), bias);

    let mut i = begin;
    while i + 4 <= end {
        let chunk = _mm256_loadu_si256(keys.as_ptr().add(i) as *const __m256i);
        let chunk_biased = _mm256_xor_si256(chunk, bias);
        let gt = _mm256_cmpgt_epi64(key_biased, chunk_biased);
        let mask = _mm256_movemask_epi8(gt) as u32;
        if mask != u32::MAX {
            for lane in 0..4 {
                let byte_group = (mask >> (lane * 8)) & 0xFF;
                if byte_group != 0xFF {
                    return i + lane;
                }
            }
        }
        i += 4;
    }
    while i < end && keys[i] < key {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::check_lower_bound;

    #[test]
    fn matches_std_lower_bound_u32() {
        let keys: Vec<u32> = (0..5000).map(|i| i * 3).collect();
        let probes: Vec<u32> = (0..15_000).step_by(11).collect();
        check_lower_bound(&LinearAvx, &keys, &probes);
    }

    #[test]
    fn matches_std_lower_bound_u64() {
        let keys: Vec<u64> = (0..5000).map(|i| i * 5).collect();
        let probes: Vec<u64> = (0..25_000).step_by(17).collect();
        check_lower_bound(&LinearAvx, &keys, &probes);
    }

    #[test]
    fn ragged_tail_not_multiple_of_lane_width() {
        let keys: Vec<u32> = (0..37).collect();
        check_lower_bound(&LinearAvx, &keys, &(0..40).collect::<Vec<u32>>());
    }
}
