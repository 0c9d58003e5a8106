//! Filter block trailer.
//!
//! The trailer is a fixed-size (5 bytes) structure at the end of a filter
//! block that locates the offset array and records the filter base.

use crate::coding::{decode_fixed32, put_fixed32, FIXED32_SIZE};
use crate::error::{Error, Result};
use crate::sstable::FILTER_TRAILER_SIZE;

/// FilterTrailer is the last 5 bytes of a filter block.
///
/// Format:
/// ```text
/// [array_offset: 4 bytes]
/// [base_lg: 1 byte]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTrailer {
    /// Offset of the filter offset array within the block
    pub array_offset: u32,
    /// Base-2 logarithm of the byte range covered by one filter
    pub base_lg: u8,
}

impl FilterTrailer {
    /// Create a new FilterTrailer
    pub fn new(array_offset: u32, base_lg: u8) -> Self {
        Self { array_offset, base_lg }
    }

    /// Append the encoded trailer to `dst`.
    pub fn encode_to(&self, dst: &mut Vec<u8>) {
        put_fixed32(dst, self.array_offset);
        dst.push(self.base_lg);
    }

    /// Encode the trailer to bytes (5 bytes)
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FILTER_TRAILER_SIZE);
        self.encode_to(&mut buf);
        buf
    }

    /// Decode a trailer from exactly 5 bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != FILTER_TRAILER_SIZE {
            return Err(Error::corruption(format!(
                "Filter trailer size mismatch: expected {}, got {}",
                FILTER_TRAILER_SIZE,
                data.len()
            )));
        }

        let array_offset = decode_fixed32(&data[..FIXED32_SIZE])
            .ok_or_else(|| Error::corruption("Filter trailer too short"))?;
        let base_lg = data[FIXED32_SIZE];

        Ok(Self { array_offset, base_lg })
    }

    /// Decode the trailer of a complete filter block and check that the
    /// offset array it points to lies inside the block.
    pub fn from_block(block: &[u8]) -> Result<Self> {
        if block.len() < FILTER_TRAILER_SIZE {
            return Err(Error::corruption(format!(
                "Filter block too short: {} bytes",
                block.len()
            )));
        }

        let body_len = block.len() - FILTER_TRAILER_SIZE;
        let trailer = Self::decode(&block[body_len..])?;
        if trailer.array_offset as usize > body_len {
            return Err(Error::corruption(format!(
                "Filter offset array at {} lies past end of block body ({} bytes)",
                trailer.array_offset, body_len
            )));
        }

        Ok(trailer)
    }

    /// Number of filters described by a block of `block_len` bytes ending
    /// with this trailer.
    pub fn num_filters(&self, block_len: usize) -> usize {
        block_len
            .saturating_sub(FILTER_TRAILER_SIZE)
            .saturating_sub(self.array_offset as usize)
            / FIXED32_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailer_encode_decode() {
        let trailer = FilterTrailer::new(1234, 11);
        let encoded = trailer.encode();
        assert_eq!(encoded.len(), FILTER_TRAILER_SIZE);
        assert_eq!(encoded, vec![0xd2, 0x04, 0x00, 0x00, 0x0b]);

        let decoded = FilterTrailer::decode(&encoded).unwrap();
        assert_eq!(decoded, trailer);
    }

    #[test]
    fn test_trailer_size_mismatch() {
        let result = FilterTrailer::decode(&[0, 0, 0, 0]);
        assert!(matches!(result.unwrap_err(), Error::Corruption(_)));

        let result = FilterTrailer::decode(&[0, 0, 0, 0, 11, 0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_trailer_from_block() {
        // Empty block: no filters, array starts at 0
        let trailer = FilterTrailer::from_block(&[0, 0, 0, 0, 11]).unwrap();
        assert_eq!(trailer, FilterTrailer::new(0, 11));
        assert_eq!(trailer.num_filters(5), 0);

        // Two filters of 3 bytes each followed by the offset array
        let mut block = vec![1, 2, 3, 4, 5, 6];
        put_fixed32(&mut block, 0);
        put_fixed32(&mut block, 3);
        FilterTrailer::new(6, 11).encode_to(&mut block);
        let trailer = FilterTrailer::from_block(&block).unwrap();
        assert_eq!(trailer.array_offset, 6);
        assert_eq!(trailer.num_filters(block.len()), 2);
    }

    #[test]
    fn test_trailer_from_block_corrupt() {
        let result = FilterTrailer::from_block(&[0, 0, 0, 11]);
        assert!(matches!(result.unwrap_err(), Error::Corruption(_)));

        // array_offset points past the trailer
        let mut block = Vec::new();
        FilterTrailer::new(1, 11).encode_to(&mut block);
        assert!(FilterTrailer::from_block(&block).is_err());
    }
}
