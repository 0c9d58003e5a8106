//! Bloom filter policy.
//!
//! A space-efficient probabilistic data structure used to test whether an element
//! is a member of a set. False positive matches are possible, but false negatives are not.
//!
//! Filter layout:
//! ```text
//! [bits: ceil(max(n * bits_per_key, 64) / 8) bytes][num_probes: 1 byte]
//! ```

use crate::filter::FilterPolicy;
use crate::hash::bloom_hash;

/// Name persisted for filters produced by [`BloomFilterPolicy`].
pub const BLOOM_POLICY_NAME: &str = "leveldb.BuiltinBloomFilter2";

/// Minimum number of bits in a filter. Small key sets would otherwise see a
/// very high false positive rate.
const MIN_FILTER_BITS: usize = 64;

/// Probe counts above this are reserved for other encodings.
const MAX_NUM_PROBES: usize = 30;

/// BloomFilterPolicy builds Bloom filters with a fixed number of bits per key.
///
/// # Example
/// ```
/// use filterblock::filter::{BloomFilterPolicy, FilterPolicy};
///
/// let policy = BloomFilterPolicy::new(10);
/// let mut filter = Vec::new();
/// policy.create_filter(&[b"key1".as_slice(), b"key2".as_slice()], &mut filter);
///
/// assert!(policy.key_may_match(b"key1", &filter));
/// assert!(policy.key_may_match(b"key2", &filter));
/// // key3 might return true (false positive) or false
/// ```
#[derive(Debug, Clone)]
pub struct BloomFilterPolicy {
    bits_per_key: usize,
    /// Number of hash probes per key
    num_probes: usize,
}

impl BloomFilterPolicy {
    /// Create a policy allocating `bits_per_key` bits for every key.
    ///
    /// 10 bits per key yields roughly a 1% false positive rate.
    pub fn new(bits_per_key: usize) -> Self {
        // 0.69 ~= ln(2), rounded down to keep probing cost low
        let num_probes = ((bits_per_key as f64) * 0.69) as usize;
        let num_probes = num_probes.clamp(1, MAX_NUM_PROBES);

        Self { bits_per_key, num_probes }
    }

    /// Get the number of bits allocated per key.
    pub fn bits_per_key(&self) -> usize {
        self.bits_per_key
    }

    /// Get the number of hash probes per key.
    pub fn num_probes(&self) -> usize {
        self.num_probes
    }

    /// Size in bytes of the filter built for `num_keys` keys, including the
    /// trailing probe count.
    pub fn filter_size(&self, num_keys: usize) -> usize {
        Self::num_bytes(num_keys * self.bits_per_key) + 1
    }

    /// Calculate the approximate false positive rate for a filter holding
    /// `num_keys` keys.
    ///
    /// This is an estimate based on the theoretical formula:
    /// p = (1 - e^(-kn/m))^k
    /// where k = num_probes, n = num_keys, m = num_bits
    pub fn estimated_false_positive_rate(&self, num_keys: usize) -> f64 {
        if num_keys == 0 {
            return 0.0;
        }

        let k = self.num_probes as f64;
        let n = num_keys as f64;
        let m = (Self::num_bytes(num_keys * self.bits_per_key) * 8) as f64;

        let exp = (-k * n / m).exp();
        (1.0 - exp).powf(k)
    }

    fn num_bytes(bits: usize) -> usize {
        (bits.max(MIN_FILTER_BITS) + 7) / 8
    }
}

impl FilterPolicy for BloomFilterPolicy {
    fn name(&self) -> &str {
        BLOOM_POLICY_NAME
    }

    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>) {
        let num_bytes = Self::num_bytes(keys.len() * self.bits_per_key);
        let num_bits = (num_bytes * 8) as u32;

        let init_size = dst.len();
        dst.resize(init_size + num_bytes, 0);
        dst.push(self.num_probes as u8);

        let bits = &mut dst[init_size..init_size + num_bytes];
        for key in keys {
            // Double hashing: h_i = h + i * delta
            let mut h = bloom_hash(key);
            let delta = h.rotate_right(17);
            for _ in 0..self.num_probes {
                let bitpos = (h % num_bits) as usize;
                bits[bitpos / 8] |= 1 << (bitpos % 8);
                h = h.wrapping_add(delta);
            }
        }
    }

    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool {
        let Some((&num_probes, bits)) = filter.split_last() else {
            return false;
        };
        if bits.is_empty() {
            return false;
        }
        if num_probes as usize > MAX_NUM_PROBES {
            // Reserved for short bloom filters and newer encodings
            return true;
        }

        let num_bits = (bits.len() * 8) as u32;
        let mut h = bloom_hash(key);
        let delta = h.rotate_right(17);
        for _ in 0..num_probes {
            let bitpos = (h % num_bits) as usize;
            if bits[bitpos / 8] & (1 << (bitpos % 8)) == 0 {
                return false; // Definitely not present
            }
            h = h.wrapping_add(delta);
        }

        true // Possibly present (or false positive)
    }
}
