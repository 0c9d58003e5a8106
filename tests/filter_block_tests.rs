// Filter Block Tests
// These tests exercise the builder and reader together with the built-in Bloom policy

use filterblock::coding::decode_fixed32;
use filterblock::sstable::{FILTER_BASE_LG, FILTER_TRAILER_SIZE};
use filterblock::{BloomFilterPolicy, FilterBlockBuilder, FilterBlockReader, FilterPolicy, FilterTrailer};
use proptest::prelude::*;
use std::sync::Arc;

fn bloom() -> Arc<dyn FilterPolicy> {
    Arc::new(BloomFilterPolicy::new(10))
}

/// One data block: its file offset and the keys it holds
type Block = (u64, Vec<Vec<u8>>);

fn build(policy: &Arc<dyn FilterPolicy>, blocks: &[Block]) -> Vec<u8> {
    let mut builder = FilterBlockBuilder::new(policy.clone());
    for (offset, keys) in blocks {
        builder.start_block(*offset);
        for key in keys {
            builder.add_key(key);
        }
    }
    builder.finish().to_vec()
}

/// Test the 5-byte block produced for a table without keys
#[test]
fn test_empty_table() {
    let policy = bloom();
    let block = build(&policy, &[]);
    assert_eq!(block, vec![0x00, 0x00, 0x00, 0x00, 0x0b]);

    let reader = FilterBlockReader::new(policy, &block);
    assert!(reader.is_empty());
    assert!(reader.key_may_match(0, b"any"));
    assert!(reader.key_may_match(123_456, b"key"));
}

/// Test a single key in the block at offset 0
#[test]
fn test_single_key() {
    let policy = bloom();
    let block = build(&policy, &[(0, vec![b"hello".to_vec()])]);

    let mut filter = Vec::new();
    policy.create_filter(&[b"hello".as_slice()], &mut filter);
    let len = filter.len();

    assert_eq!(&block[..len], filter.as_slice());
    assert_eq!(&block[len..len + 4], &[0, 0, 0, 0]);
    assert_eq!(&block[len + 4..len + 8], &(len as u32).to_le_bytes());
    assert_eq!(block[len + 8], 0x0b);
    assert_eq!(block.len(), len + 9);

    let reader = FilterBlockReader::new(policy, &block);
    assert!(reader.key_may_match(0, b"hello"));
    assert!(!reader.key_may_match(0, b"world"));
}

/// Test that gaps between data blocks become empty filters
#[test]
fn test_sparse_offsets_force_empty_filters() {
    let policy = bloom();
    let block = build(&policy, &[(0, vec![b"a".to_vec()]), (6000, vec![b"b".to_vec()])]);

    let reader = FilterBlockReader::new(policy, &block);
    assert_eq!(reader.num_filters(), 3);
    assert!(!reader.filter(0).unwrap().is_empty());
    assert!(reader.filter(1).unwrap().is_empty());
    assert!(!reader.filter(2).unwrap().is_empty());

    assert!(reader.key_may_match(0, b"a"));
    assert!(!reader.key_may_match(2048, b"a"));
    assert!(reader.key_may_match(6000, b"b"));
}

/// Test that blocks starting in the same window share one filter
#[test]
fn test_multiple_blocks_share_window() {
    let policy = bloom();
    let block = build(
        &policy,
        &[(0, vec![b"a".to_vec()]), (1000, vec![b"b".to_vec()]), (3000, vec![b"c".to_vec()])],
    );

    let reader = FilterBlockReader::new(policy, &block);
    assert_eq!(reader.num_filters(), 2);
    assert!(reader.key_may_match(1000, b"a"));
    assert!(reader.key_may_match(0, b"b"));
    assert!(reader.key_may_match(3000, b"c"));
}

/// Test that a truncated block fails open
#[test]
fn test_corrupt_trailer() {
    let policy = bloom();
    let block = build(&policy, &[(0, vec![b"a".to_vec()])]);

    let reader = FilterBlockReader::new(policy, &block[..4]);
    assert!(reader.is_empty());
    for key in [b"a".as_slice(), b"b", b"zzz"] {
        assert!(reader.key_may_match(0, key));
    }
}

/// Test that offsets past the last filter fail open
#[test]
fn test_out_of_range_index() {
    let policy = bloom();
    let block = build(&policy, &[(0, vec![b"a".to_vec()]), (2048, vec![b"b".to_vec()])]);

    let reader = FilterBlockReader::new(policy, &block);
    assert_eq!(reader.num_filters(), 2);
    assert!(reader.key_may_match(1_000_000, b"x"));
}

/// Test that a key straddling a window boundary stays with its block's start
#[test]
fn test_block_straddling_window_boundary() {
    let policy = bloom();
    let block = build(&policy, &[(2000, vec![b"straddle".to_vec()]), (2100, vec![b"next".to_vec()])]);

    let reader = FilterBlockReader::new(policy, &block);
    assert_eq!(reader.num_filters(), 2);
    assert!(reader.key_may_match(2000, b"straddle"));
    assert!(reader.key_may_match(2100, b"next"));
    assert!(!reader.key_may_match(2100, b"straddle"));
}

fn block_strategy() -> impl Strategy<Value = Vec<Block>> {
    let keys = prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..8);
    prop::collection::vec((0u64..5000, keys), 0..20).prop_map(|deltas| {
        let mut offset = 0u64;
        deltas
            .into_iter()
            .map(|(delta, keys)| {
                offset += delta;
                (offset, keys)
            })
            .collect()
    })
}

fn expected_num_filters(blocks: &[Block]) -> usize {
    let Some((last, _)) = blocks.last() else {
        return 0;
    };
    let max_index = last >> FILTER_BASE_LG;
    let last_window_has_keys =
        blocks.iter().any(|(offset, keys)| offset >> FILTER_BASE_LG == max_index && !keys.is_empty());
    max_index as usize + usize::from(last_window_has_keys)
}

proptest! {
    #[test]
    fn prop_inserted_keys_always_match(blocks in block_strategy()) {
        let policy = bloom();
        let block = build(&policy, &blocks);
        let reader = FilterBlockReader::new(policy, &block);

        for (offset, keys) in &blocks {
            for key in keys {
                prop_assert!(reader.key_may_match(*offset, key));
            }
        }
    }

    #[test]
    fn prop_only_empty_windows_reject_outright(blocks in block_strategy()) {
        let policy = bloom();
        let block = build(&policy, &blocks);
        let reader = FilterBlockReader::new(policy, &block);

        for index in 0..reader.num_filters() {
            let has_keys = blocks
                .iter()
                .any(|(offset, keys)| (offset >> FILTER_BASE_LG) as usize == index && !keys.is_empty());
            let filter = reader.filter(index).unwrap();
            prop_assert_eq!(filter.is_empty(), !has_keys);
        }
    }

    #[test]
    fn prop_layout_is_consistent(blocks in block_strategy()) {
        let policy = bloom();
        let block = build(&policy, &blocks);

        let num = expected_num_filters(&blocks);
        let trailer = FilterTrailer::from_block(&block).unwrap();
        prop_assert_eq!(trailer.base_lg, 11);
        prop_assert_eq!(trailer.array_offset as usize + 4 * num + FILTER_TRAILER_SIZE, block.len());

        // Offsets are non-decreasing and stay within the filter data
        let offsets: Vec<u32> = block[trailer.array_offset as usize..block.len() - FILTER_TRAILER_SIZE]
            .chunks_exact(4)
            .map(|word| decode_fixed32(word).unwrap())
            .collect();
        prop_assert_eq!(offsets.len(), num);
        prop_assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(offsets.iter().all(|&offset| offset <= trailer.array_offset));
    }

    #[test]
    fn prop_builds_are_deterministic(blocks in block_strategy()) {
        let policy = bloom();
        prop_assert_eq!(build(&policy, &blocks), build(&policy, &blocks));
    }

    #[test]
    fn prop_reader_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64), offset in any::<u64>()) {
        let reader = FilterBlockReader::new(bloom(), &bytes);
        let _ = reader.key_may_match(offset, b"key");
        if bytes.len() < FILTER_TRAILER_SIZE {
            prop_assert!(reader.key_may_match(offset, b"key"));
        }
    }
}
