//! Decode-time security limits

/// Bounds applied while decoding untrusted input
///
/// Every count read off the wire is additionally bounded by the remaining
/// input length before any allocation is sized from it, so these limits
/// only need to cap what a plausible-length input could still amplify.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum entries in the property-name interning table
    pub max_names: usize,
    /// Maximum entries in the string-value interning table
    pub max_strings: usize,
    /// Maximum byte length of a single interned string or name
    pub max_string_len: usize,
    /// Maximum length of a raw byte buffer value
    pub max_bytes_len: usize,
    /// Maximum container nesting depth
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_names: 1_000_000,
            max_strings: 1_000_000,
            max_string_len: 16 * 1024 * 1024,
            max_bytes_len: 256 * 1024 * 1024,
            max_depth: 512,
        }
    }
}
