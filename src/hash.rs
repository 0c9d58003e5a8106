//! 32-bit hash used by the built-in Bloom filter policy.
//!
//! This is part of the on-disk format: changing it invalidates every
//! previously written Bloom filter.

use crate::coding::decode_fixed32;

/// Seed used when hashing keys for Bloom filters.
pub const BLOOM_HASH_SEED: u32 = 0xbc9f_1d34;

/// Murmur-like hash over `data`, consuming 4-byte little-endian words.
pub fn hash(data: &[u8], seed: u32) -> u32 {
    const M: u32 = 0xc6a4_a793;
    const R: u32 = 24;

    let mut h = seed ^ (data.len() as u32).wrapping_mul(M);

    let mut words = data.chunks_exact(4);
    for word in &mut words {
        let w = decode_fixed32(word).unwrap_or_default();
        h = h.wrapping_add(w).wrapping_mul(M);
        h ^= h >> 16;
    }

    let rest = words.remainder();
    if rest.len() >= 3 {
        h = h.wrapping_add((rest[2] as u32) << 16);
    }
    if rest.len() >= 2 {
        h = h.wrapping_add((rest[1] as u32) << 8);
    }
    if !rest.is_empty() {
        h = h.wrapping_add(rest[0] as u32).wrapping_mul(M);
        h ^= h >> R;
    }
    h
}

/// Hash of `key` as consumed by the Bloom filter policy.
#[inline]
pub fn bloom_hash(key: &[u8]) -> u32 {
    hash(key, BLOOM_HASH_SEED)
}
