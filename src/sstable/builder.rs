//! Filter block builder implementation.
//!
//! Builds the filter block of one SSTable from the keys of its data blocks.

use crate::coding::{put_fixed32, FIXED32_SIZE};
use crate::config::FilterOptions;
use crate::filter::FilterPolicy;
use crate::sstable::trailer::FilterTrailer;
use crate::sstable::{FILTER_BASE_LG, FILTER_TRAILER_SIZE};
use std::sync::Arc;

/// FilterBlockBuilder builds all of the filters for a particular table.
///
/// The sequence of calls must match `(start_block add_key*)* finish`:
/// call [`start_block`](Self::start_block) with the file offset of each data
/// block before adding that block's keys.
///
/// Usage:
/// ```
/// use filterblock::filter::BloomFilterPolicy;
/// use filterblock::sstable::{FilterBlockBuilder, FilterBlockReader};
/// use std::sync::Arc;
///
/// let policy = Arc::new(BloomFilterPolicy::new(10));
/// let mut builder = FilterBlockBuilder::new(policy.clone());
/// builder.start_block(0);
/// builder.add_key(b"key1");
/// builder.start_block(4096);
/// builder.add_key(b"key2");
/// let block = builder.finish().to_vec();
///
/// let reader = FilterBlockReader::new(policy, &block);
/// assert!(reader.key_may_match(0, b"key1"));
/// assert!(reader.key_may_match(4096, b"key2"));
/// ```
pub struct FilterBlockBuilder {
    policy: Arc<dyn FilterPolicy>,
    base_lg: u8,
    /// Flattened contents of the keys pending for the current filter
    keys: Vec<u8>,
    /// Start of each pending key in `keys`
    starts: Vec<usize>,
    /// Filters computed so far, then the offset array and trailer
    result: Vec<u8>,
    /// Start of each filter in `result`
    filter_offsets: Vec<u32>,
    finished: bool,
}

impl FilterBlockBuilder {
    /// Create a builder using the default filter base (2KB).
    pub fn new(policy: Arc<dyn FilterPolicy>) -> Self {
        Self::with_base_lg(policy, FILTER_BASE_LG)
    }

    /// Create a builder using the filter base from `options`.
    pub fn with_options(policy: Arc<dyn FilterPolicy>, options: &FilterOptions) -> Self {
        Self::with_base_lg(policy, options.filter_base_lg)
    }

    fn with_base_lg(policy: Arc<dyn FilterPolicy>, base_lg: u8) -> Self {
        Self {
            policy,
            base_lg,
            keys: Vec::new(),
            starts: Vec::new(),
            result: Vec::new(),
            filter_offsets: Vec::new(),
            finished: false,
        }
    }

    /// Get the policy filters are built with.
    pub fn policy(&self) -> &Arc<dyn FilterPolicy> {
        &self.policy
    }

    /// Get the encoded filter base logarithm.
    pub fn base_lg(&self) -> u8 {
        self.base_lg
    }

    /// Number of filters emitted so far.
    pub fn num_filters(&self) -> usize {
        self.filter_offsets.len()
    }

    /// Mark the start of a new data block at file offset `block_offset`.
    ///
    /// Emits filters for every window before the one containing
    /// `block_offset`; windows that received no keys get empty filters.
    pub fn start_block(&mut self, block_offset: u64) {
        debug_assert!(!self.finished, "start_block called after finish");

        // Oversized bases put every block in filter 0, matching the reader
        let filter_index = block_offset.checked_shr(self.base_lg as u32).unwrap_or(0);
        let emitted = self.filter_offsets.len() as u64;
        if filter_index < emitted {
            log::warn!(
                "Data block offset {} maps to filter {} but {} filters are already emitted",
                block_offset,
                filter_index,
                emitted
            );
            return;
        }

        while (self.filter_offsets.len() as u64) < filter_index {
            self.generate_filter();
        }
    }

    /// Add a key to the filter of the current data block.
    pub fn add_key(&mut self, key: &[u8]) {
        debug_assert!(!self.finished, "add_key called after finish");

        self.starts.push(self.keys.len());
        self.keys.extend_from_slice(key);
    }

    /// Finish the filter block.
    ///
    /// Returns the serialized block, which stays valid until the builder is
    /// reset or dropped.
    pub fn finish(&mut self) -> &[u8] {
        debug_assert!(!self.finished, "finish called twice");

        if !self.starts.is_empty() {
            self.generate_filter();
        }

        // Append the per-filter offsets, then the trailer locating them
        debug_assert!(self.result.len() <= u32::MAX as usize, "filter data exceeds 4GB");
        let array_offset = self.result.len() as u32;
        self.result
            .reserve(self.filter_offsets.len() * FIXED32_SIZE + FILTER_TRAILER_SIZE);
        for &offset in &self.filter_offsets {
            put_fixed32(&mut self.result, offset);
        }
        FilterTrailer::new(array_offset, self.base_lg).encode_to(&mut self.result);
        self.finished = true;

        log::debug!(
            "Finished filter block: {} filters, {} bytes",
            self.filter_offsets.len(),
            self.result.len()
        );

        &self.result
    }

    /// Reset the builder so it can be reused for a new table.
    pub fn reset(&mut self) {
        self.keys.clear();
        self.starts.clear();
        self.result.clear();
        self.filter_offsets.clear();
        self.finished = false;
    }

    /// Emit the filter for the pending keys and start the next one.
    fn generate_filter(&mut self) {
        debug_assert!(self.result.len() <= u32::MAX as usize, "filter data exceeds 4GB");
        self.filter_offsets.push(self.result.len() as u32);
        if self.starts.is_empty() {
            // Fast path if there are no keys for this filter
            return;
        }

        let flat = &self.keys;
        let starts = &self.starts;
        let keys: Vec<&[u8]> = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let limit = starts.get(i + 1).copied().unwrap_or(flat.len());
                &flat[start..limit]
            })
            .collect();
        self.policy.create_filter(&keys, &mut self.result);

        self.keys.clear();
        self.starts.clear();
    }
}
