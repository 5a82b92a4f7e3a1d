use thiserror::Error;

/// Failures raised while decoding an NBFT table.
///
/// Header-level variants abort the whole decode. Heap and per-array
/// variants are scoped to the field or array that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The first four bytes are not `NBFT`.
    #[error("Invalid signature {found:02x?}")]
    BadSignature { found: [u8; 4] },

    /// Only major revision 1 is understood.
    #[error("Unsupported NBFT revision {major}.{minor}")]
    UnsupportedRevision { major: u8, minor: u8 },

    /// A declared region reaches past the end of the buffer (or of its container).
    #[error("Truncated {what}: need {needed} bytes at offset {offset}, have {available}")]
    TruncatedBuffer {
        what: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// A heap reference starts before the heap region.
    #[error("Heap offset mismatch (heap {heap_offset}, offset {offset})")]
    HeapOffsetOutOfRange { offset: u32, heap_offset: u32 },

    /// A heap reference ends after the heap region.
    #[error(
        "Heap length mismatch (heap {heap_offset} + {heap_length}, offset {offset} + {length})"
    )]
    HeapLengthOutOfRange {
        offset: u32,
        length: u32,
        heap_offset: u32,
        heap_length: u32,
    },

    /// Table bytes do not sum to zero modulo 256.
    #[error("Checksum mismatch: table sums to {sum:#04x}")]
    ChecksumMismatch { sum: u8 },

    /// Decoder configuration could not be parsed.
    #[error("Invalid decode configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl FormatError {
    pub fn truncated(what: &'static str, offset: u64, needed: u64, available: usize) -> Self {
        FormatError::TruncatedBuffer {
            what,
            offset,
            needed,
            available: available as u64,
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        FormatError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result type alias for table-level operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Outcome of resolving a single embedded heap field.
pub type HeapField<T> = std::result::Result<T, FormatError>;
