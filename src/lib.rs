//! # filterblock - SSTable Filter Blocks
//!
//! An SSTable stores its entries in data blocks, and a point lookup first has
//! to pick the one data block that may hold the key. The filter block lets a
//! reader reject most absent keys in memory, before issuing a random read
//! against that data block.
//!
//! ## Architecture
//!
//! - **Filter Policy**: Builds a compact filter from a set of keys and probes it
//!   ([`FilterPolicy`], with the built-in [`BloomFilterPolicy`])
//! - **Filter Block Builder**: Groups keys by the 2KB window their data block
//!   starts in and serializes one filter per window
//! - **Filter Block Reader**: Maps a data block offset back to its filter and
//!   answers membership queries, failing open on malformed input
//!
//! ## Example Usage
//!
//! ```rust
//! use filterblock::{FilterBlockBuilder, FilterBlockReader, FilterOptions};
//!
//! # fn main() -> Result<(), filterblock::Error> {
//! let options = FilterOptions::default();
//! options.validate()?;
//! let policy = options.filter_policy().expect("bloom filter enabled");
//!
//! // Table writer side: one start_block per data block, one add_key per key
//! let mut builder = FilterBlockBuilder::with_options(policy.clone(), &options);
//! builder.start_block(0);
//! builder.add_key(b"apple");
//! builder.add_key(b"banana");
//! builder.start_block(4096);
//! builder.add_key(b"cherry");
//! let block = builder.finish().to_vec();
//!
//! // Table reader side
//! let reader = FilterBlockReader::new(policy, &block);
//! assert!(reader.key_may_match(0, b"apple"));
//! assert!(reader.key_may_match(4096, b"cherry"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod coding;
pub mod config;
pub mod error;
pub mod filter;
pub mod hash;
pub mod sstable;

// Re-exports
pub use config::FilterOptions;
pub use error::{Error, Result};
pub use filter::{BloomFilterPolicy, FilterPolicy};
pub use sstable::{filter_meta_key, FilterBlockBuilder, FilterBlockReader, FilterTrailer};
