//! Hash functions for bucket placement.
//!
//! Uses FNV-1a for fast, const-compatible hashing with good distribution on
//! the short keys we deal with (1-8 byte enum values, `TypeId`s).

use std::hash::{BuildHasher, Hash, Hasher};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a 64-bit hash, usable in const context.
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Bucket count for `len` entries: next power of two ≥ max(1, len).
#[inline]
pub const fn bucket_count_for(len: usize) -> usize {
    if len <= 1 { 1 } else { len.next_power_of_two() }
}

/// Map a hash onto a power-of-two bucket array.
#[inline]
pub const fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    debug_assert!(bucket_count.is_power_of_two(), "bucket count must be a power of two");
    // Fold the high half in; small integers differ mostly in the low byte.
    let mixed = hash ^ (hash >> 32);
    (mixed as usize) & (bucket_count - 1)
}

/// Streaming FNV-1a, for keys that only expose [`Hash`].
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> Self {
        Self(FNV_OFFSET)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

/// [`BuildHasher`] for [`FnvHasher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    #[inline]
    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::default()
    }
}

/// Hash any `Hash` key with FNV-1a.
#[inline]
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> u64 {
    FnvBuildHasher.hash_one(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_basic_sanity() {
        assert_ne!(fnv1a_64(b"hello"), fnv1a_64(b"world"));
        assert_eq!(fnv1a_64(b"hello"), fnv1a_64(b"hello"));
        assert_eq!(fnv1a_64(b""), FNV_OFFSET);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut hasher = FnvHasher::default();
        hasher.write(b"hel");
        hasher.write(b"lo");
        assert_eq!(hasher.finish(), fnv1a_64(b"hello"));
    }

    #[test]
    fn bucket_counts_are_powers_of_two() {
        assert_eq!(bucket_count_for(0), 1);
        assert_eq!(bucket_count_for(1), 1);
        assert_eq!(bucket_count_for(2), 2);
        assert_eq!(bucket_count_for(3), 4);
        assert_eq!(bucket_count_for(17), 32);
        assert_eq!(bucket_count_for(64), 64);
    }

    #[test]
    fn bucket_index_stays_in_range() {
        for n in [1usize, 2, 8, 64] {
            for v in 0u32..200 {
                assert!(bucket_index(fnv1a_64(&v.to_le_bytes()), n) < n);
            }
        }
    }

    #[test]
    fn small_values_spread_across_buckets() {
        let mut seen = [false; 8];
        for v in 0u8..8 {
            seen[bucket_index(fnv1a_64(&[v]), 8)] = true;
        }
        // Not a perfect spread, but 8 consecutive values must not all collide.
        assert!(seen.iter().filter(|&&s| s).count() > 2);
    }

    #[test]
    fn hash_key_is_deterministic() {
        assert_eq!(hash_key(&42u32), hash_key(&42u32));
        assert_ne!(hash_key("a"), hash_key("b"));
    }
}
