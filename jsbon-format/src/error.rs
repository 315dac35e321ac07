//! Error types for the JSBON format

use thiserror::Error;

/// JSBON error taxonomy
///
/// Every failure aborts the current encode/decode call; no partial result
/// is surfaced.
#[derive(Debug, Error)]
pub enum JsbonError {
    /// Decode input is absent or not a usable byte buffer
    #[error("invalid input data: {0}")]
    InvalidData(String),
    /// Decoded major version exceeds what this implementation understands
    #[error("unsupported major version: {0}")]
    VersionMismatch(u8),
    /// CRC32 present and does not match recomputation over the payload
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// Encoder encountered a value it cannot represent on the wire
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// A count is negative, non-integral, or not representable
    #[error("invalid count: {0}")]
    InvalidCount(String),
    /// Decoder read a tag byte not legal in the current context
    #[error("unexpected tag byte 0x{0:02x}")]
    UnexpectedTag(u8),
    /// String/name index or back-edge position not registered
    #[error("reference out of bounds: {0}")]
    OutOfBoundsReference(u32),
    /// Stream ended before a required field was read
    #[error("unexpected end of input")]
    Truncated,
    /// A decode-time security limit was exceeded
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, JsbonError>;
