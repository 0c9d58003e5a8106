//! Filter block reader implementation.
//!
//! Maps a data block offset to its filter and answers membership queries.
//! The reader never fails: a malformed block or filter answers "may match",
//! since the data block itself remains the source of truth.

use crate::coding::{decode_fixed32, FIXED32_SIZE};
use crate::filter::FilterPolicy;
use crate::sstable::trailer::FilterTrailer;
use std::sync::Arc;

/// FilterBlockReader is a read-only view over the bytes of a filter block.
///
/// The reader borrows the block; it is `Send + Sync` and can be queried from
/// any number of threads at once.
pub struct FilterBlockReader<'a> {
    policy: Arc<dyn FilterPolicy>,
    /// Concatenated filters (block start up to the offset array)
    data: &'a [u8],
    /// Offset array followed by the trailer's array_offset, which closes
    /// the last filter
    offsets: &'a [u8],
    /// Number of filters
    num: usize,
    base_lg: u8,
}

/// Location of one filter inside the block.
enum FilterSlot<'a> {
    /// The window held no keys.
    Empty,
    /// The offsets for this filter are inconsistent.
    Corrupt,
    Filter(&'a [u8]),
}

impl<'a> FilterBlockReader<'a> {
    /// Create a reader over `contents`.
    ///
    /// A block that is too short or whose offset array lies outside the
    /// block yields an empty reader that reports every key as a possible
    /// match.
    pub fn new(policy: Arc<dyn FilterPolicy>, contents: &'a [u8]) -> Self {
        let mut reader = Self { policy, data: &[], offsets: &[], num: 0, base_lg: 0 };

        let trailer = match FilterTrailer::from_block(contents) {
            Ok(trailer) => trailer,
            Err(e) => {
                log::warn!("Ignoring malformed filter block: {}", e);
                return reader;
            }
        };

        let array_offset = trailer.array_offset as usize;
        reader.data = &contents[..array_offset];
        reader.offsets = &contents[array_offset..contents.len() - 1];
        reader.num = trailer.num_filters(contents.len());
        reader.base_lg = trailer.base_lg;
        reader
    }

    /// Check if `key` may be present in the data block starting at
    /// `block_offset`.
    ///
    /// Returns `false` only when the filter covering `block_offset` rules the
    /// key out.
    pub fn key_may_match(&self, block_offset: u64, key: &[u8]) -> bool {
        let Some(index) = self.filter_index(block_offset) else {
            // Errors are treated as potential matches
            return true;
        };

        match self.slot(index) {
            FilterSlot::Empty => false,
            FilterSlot::Corrupt => {
                log::debug!("Inconsistent offsets for filter {}, treating as match", index);
                true
            }
            FilterSlot::Filter(filter) => self.policy.key_may_match(key, filter),
        }
    }

    /// Get the filter at `index`.
    ///
    /// Returns an empty slice for a window without keys and `None` when the
    /// index is out of range or the filter's offsets are inconsistent.
    pub fn filter(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.num {
            return None;
        }
        match self.slot(index) {
            FilterSlot::Empty => Some(&[]),
            FilterSlot::Corrupt => None,
            FilterSlot::Filter(filter) => Some(filter),
        }
    }

    /// Number of filters in the block.
    pub fn num_filters(&self) -> usize {
        self.num
    }

    /// Check if the reader holds no filters, either because the block was
    /// malformed or because the table had no keys.
    pub fn is_empty(&self) -> bool {
        self.num == 0
    }

    /// Get the filter base logarithm read from the block.
    pub fn base_lg(&self) -> u8 {
        self.base_lg
    }

    /// Get the policy used to probe filters.
    pub fn policy(&self) -> &Arc<dyn FilterPolicy> {
        &self.policy
    }

    /// Filter index covering `block_offset`, if the block has one.
    fn filter_index(&self, block_offset: u64) -> Option<usize> {
        let index = block_offset.checked_shr(self.base_lg as u32).unwrap_or(0);
        if index < self.num as u64 {
            Some(index as usize)
        } else {
            log::trace!("No filter for block offset {} ({} filters)", block_offset, self.num);
            None
        }
    }

    fn slot(&self, index: usize) -> FilterSlot<'a> {
        let pos = index * FIXED32_SIZE;
        let bounds = self.offsets.get(pos..).and_then(decode_fixed32).zip(
            self.offsets.get(pos + FIXED32_SIZE..).and_then(decode_fixed32),
        );
        let Some((start, limit)) = bounds else {
            return FilterSlot::Corrupt;
        };

        let data = self.data;
        let (start, limit) = (start as usize, limit as usize);
        if start == limit {
            FilterSlot::Empty
        } else if start > limit || limit > data.len() {
            FilterSlot::Corrupt
        } else {
            FilterSlot::Filter(&data[start..limit])
        }
    }
}
