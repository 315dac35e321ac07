//! Stream header byte codec
//!
//! The first byte of every stream carries the major version in its low
//! nibble and option flags in its high nibble. Bits 4 and 5 are reserved
//! and written zero; the decoder ignores them.

use crate::constants::{MAJOR_VERSION, OPTION_CRC32, OPTION_NOCYCLE, VERSION_MASK};
use crate::error::{JsbonError, Result};

/// Decoded form of the stream's first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Major format version (low nibble)
    pub version: u8,
    /// Whether a CRC32 of the payload follows the header byte
    pub has_crc: bool,
    /// Producer hint that no back-edge closes a cycle
    pub no_cycle: bool,
}

impl Header {
    /// Build a current-version header with the given options
    pub fn new(has_crc: bool, no_cycle: bool) -> Self {
        Self {
            version: MAJOR_VERSION,
            has_crc,
            no_cycle,
        }
    }

    /// Encode to the wire byte
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.version & VERSION_MASK;
        if self.has_crc {
            byte |= OPTION_CRC32;
        }
        if self.no_cycle {
            byte |= OPTION_NOCYCLE;
        }
        byte
    }

    /// Decode from the wire byte, gating on the major version
    pub fn from_byte(byte: u8) -> Result<Self> {
        let version = byte & VERSION_MASK;
        if version > MAJOR_VERSION {
            return Err(JsbonError::VersionMismatch(version));
        }
        Ok(Self {
            version,
            has_crc: byte & OPTION_CRC32 != 0,
            no_cycle: byte & OPTION_NOCYCLE != 0,
        })
    }
}
