//! Filter policies for efficient key existence checking.
//!
//! A policy turns the keys of one slice of a table into a compact bitstring
//! and later answers whether a key may be in that set. The filter block
//! stores one such bitstring per filter base window.

pub mod bloom;

pub use bloom::BloomFilterPolicy;

/// Strategy for building and probing filters.
///
/// Implementations must be deterministic and thread-safe: the same policy
/// instance is shared by the table writer and any number of readers.
pub trait FilterPolicy: Send + Sync {
    /// Name of this policy.
    ///
    /// The name is persisted in the table's meta-index, so it must change
    /// whenever the filter encoding changes incompatibly.
    fn name(&self) -> &str;

    /// Append a filter summarizing `keys` to `dst`.
    ///
    /// Existing contents of `dst` must be left untouched.
    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>);

    /// Check if `key` may be in the set `filter` was built from.
    ///
    /// Must return `true` for every key passed to the `create_filter` call
    /// that produced `filter` (no false negatives).
    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool;
}
