//! Fixed-width little-endian integer coding used by the filter block format.

use bytes::{Buf, BufMut};

/// Size in bytes of an encoded `u32`.
pub const FIXED32_SIZE: usize = 4;

/// Appends `value` to `dst` as 4 little-endian bytes.
#[inline]
pub fn put_fixed32(dst: &mut Vec<u8>, value: u32) {
    dst.put_u32_le(value);
}

/// Decodes a little-endian `u32` from the first 4 bytes of `src`.
///
/// Returns `None` if `src` is shorter than 4 bytes.
#[inline]
pub fn decode_fixed32(src: &[u8]) -> Option<u32> {
    let mut word = src.get(..FIXED32_SIZE)?;
    Some(word.get_u32_le())
}
