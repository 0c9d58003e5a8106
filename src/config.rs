//! Configuration options for filter block construction.

use crate::filter::{BloomFilterPolicy, FilterPolicy};
use crate::sstable::FILTER_BASE_LG;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default bits per key for the built-in Bloom policy (~1% false positives).
pub const DEFAULT_BITS_PER_KEY: usize = 10;

/// Largest accepted `bits_per_key`.
pub const MAX_BITS_PER_KEY: usize = 64;

/// Largest accepted `filter_base_lg`; larger shifts would leave a single
/// filter covering the whole u32 offset space.
pub const MAX_FILTER_BASE_LG: u8 = 31;

/// Options controlling how a table writer builds its filter block.
///
/// Readers do not consult these: the filter base is read back from the
/// encoded block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Build a filter block at all.
    /// Default: true
    pub use_bloom_filter: bool,

    /// Bits allocated per key in each Bloom filter.
    /// Default: 10
    pub bits_per_key: usize,

    /// Base-2 logarithm of the byte range covered by one filter.
    /// Default: 11 (one filter per 2KB of table data)
    pub filter_base_lg: u8,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            use_bloom_filter: true,
            bits_per_key: DEFAULT_BITS_PER_KEY,
            filter_base_lg: FILTER_BASE_LG,
        }
    }
}

impl FilterOptions {
    /// Creates a new FilterOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the Bloom filter.
    pub fn use_bloom_filter(mut self, value: bool) -> Self {
        self.use_bloom_filter = value;
        self
    }

    /// Sets the bits allocated per key.
    pub fn bits_per_key(mut self, bits: usize) -> Self {
        self.bits_per_key = bits;
        self
    }

    /// Sets the filter base logarithm.
    pub fn filter_base_lg(mut self, base_lg: u8) -> Self {
        self.filter_base_lg = base_lg;
        self
    }

    /// Byte range covered by one filter.
    pub fn filter_base(&self) -> u64 {
        1u64 << self.filter_base_lg
    }

    /// Parses options from JSON and validates them. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let options: FilterOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.bits_per_key == 0 || self.bits_per_key > MAX_BITS_PER_KEY {
            return Err(crate::Error::invalid_argument(format!(
                "bits_per_key must be between 1 and {}",
                MAX_BITS_PER_KEY
            )));
        }
        if self.filter_base_lg == 0 || self.filter_base_lg > MAX_FILTER_BASE_LG {
            return Err(crate::Error::invalid_argument(format!(
                "filter_base_lg must be between 1 and {}",
                MAX_FILTER_BASE_LG
            )));
        }
        Ok(())
    }

    /// Returns the policy a table writer should use, or `None` when filters
    /// are disabled.
    pub fn filter_policy(&self) -> Option<Arc<dyn FilterPolicy>> {
        if self.use_bloom_filter {
            Some(Arc::new(BloomFilterPolicy::new(self.bits_per_key)))
        } else {
            None
        }
    }
}
