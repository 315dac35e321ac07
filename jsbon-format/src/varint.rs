//! Variable-length count encoding
//!
//! Counts are unsigned 32-bit quantities written base-128, little-endian
//! byte order, high bit as continuation. Every count fits in 1-5 bytes; a
//! fifth byte with a continuation bit, or with value bits beyond 32, is
//! malformed.

use smallvec::SmallVec;

use crate::constants::MAX_COUNT_BYTES;
use crate::error::{JsbonError, Result};
use crate::stream::{ByteReader, ByteWriter};

/// Encode a count to a standalone buffer
pub fn encode_count(count: u32) -> SmallVec<[u8; MAX_COUNT_BYTES]> {
    let mut result = SmallVec::new();
    let mut x = count;

    while x >= 0x80 {
        result.push((x & 0x7F) as u8 | 0x80);
        x >>= 7;
    }
    result.push(x as u8);

    result
}

/// Append a count to a byte stream
pub fn write_count(out: &mut ByteWriter, count: u32) {
    let mut x = count;

    while x >= 0x80 {
        out.put_u8((x & 0x7F) as u8 | 0x80);
        x >>= 7;
    }
    out.put_u8(x as u8);
}

/// Read a count from a byte stream
pub fn read_count(reader: &mut ByteReader<'_>) -> Result<u32> {
    let mut result = 0u32;

    for shift in [0u32, 7, 14, 21] {
        let byte = reader.get_u8()?;
        result |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }

    // fifth byte: at most four value bits remain, no continuation allowed
    let byte = reader.get_u8()?;
    if byte & 0x80 != 0 {
        return Err(JsbonError::InvalidCount(
            "count continues past 5 bytes".to_string(),
        ));
    }
    if byte > 0x0F {
        return Err(JsbonError::InvalidCount(
            "count overflows 32 bits".to_string(),
        ));
    }
    Ok(result | ((byte as u32) << 28))
}

/// Convert an in-memory length to a wire count
pub fn to_count(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| JsbonError::InvalidCount(format!("length {} exceeds u32 range", len)))
}
