//! SSTable filter block.
//!
//! A table stores a single filter block near its end, recorded in the
//! meta-index under [`filter_meta_key`]. The table's byte range is cut into
//! aligned windows of `2^base_lg` bytes and every window gets one filter,
//! holding the keys of all data blocks that *start* inside it.
//!
//! ## Block Format
//!
//! ```text
//! [filter 0]
//! [filter 1]
//! ...
//! [filter N-1]
//! [offset of filter 0: 4B]
//! ...
//! [offset of filter N-1: 4B]
//! [array_offset: 4B]   // start of the offset array
//! [base_lg: 1B]
//! ```
//!
//! Filter `i` spans `[offset_i, offset_{i+1})`, with `offset_N` being
//! `array_offset`. Windows without data blocks are zero-length filters.

pub mod builder;
pub mod reader;
pub mod trailer;

pub use builder::FilterBlockBuilder;
pub use reader::FilterBlockReader;
pub use trailer::FilterTrailer;

use crate::filter::FilterPolicy;

/// Default filter base logarithm: one filter per 2KB of table data.
pub const FILTER_BASE_LG: u8 = 11;

/// Default byte range covered by one filter.
pub const FILTER_BASE: u64 = 1 << FILTER_BASE_LG;

/// Trailer size in bytes (fixed): array_offset plus base_lg.
pub const FILTER_TRAILER_SIZE: usize = 5;

/// Prefix of the meta-index key that points at the filter block.
pub const FILTER_META_KEY_PREFIX: &str = "filter.";

/// Meta-index key under which a table records the filter block built with
/// `policy`.
pub fn filter_meta_key(policy: &dyn FilterPolicy) -> String {
    format!("{}{}", FILTER_META_KEY_PREFIX, policy.name())
}
