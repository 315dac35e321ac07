//! CRC32 checksum utilities
//!
//! IEEE 802.3 reflected polynomial `0xEDB88320`, seeded and finalized with
//! `0xFFFFFFFF`. The checksum covers the payload region only, never the
//! header or the interning tables.

use crate::error::{JsbonError, Result};

/// Compute the CRC32 of `data`
pub fn compute_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Verify the CRC32 of `data` against an expected value
pub fn verify_crc32(data: &[u8], expected: u32) -> Result<()> {
    let actual = compute_crc32(data);
    if actual == expected {
        Ok(())
    } else {
        Err(JsbonError::ChecksumMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        // the standard CRC-32/IEEE check value
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_empty() {
        assert_eq!(compute_crc32(b""), 0);
    }

    #[test]
    fn test_crc32_verify_match() {
        let data = b"payload bytes";
        let crc = compute_crc32(data);
        assert!(verify_crc32(data, crc).is_ok());
    }

    #[test]
    fn test_crc32_verify_mismatch() {
        let data = b"payload bytes";
        let crc = compute_crc32(data);
        assert!(matches!(
            verify_crc32(data, crc ^ 1),
            Err(JsbonError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_crc32_single_bit_sensitivity() {
        let data = b"payload bytes".to_vec();
        let crc = compute_crc32(&data);
        for i in 0..data.len() * 8 {
            let mut flipped = data.clone();
            flipped[i / 8] ^= 1 << (i % 8);
            assert_ne!(compute_crc32(&flipped), crc);
        }
    }
}
