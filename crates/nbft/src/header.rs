//! Table header validation.

use serde::Serialize;
use tracing::{debug, warn};

use crate::bytes::{read_array, slice_checked, Record};
use crate::config::{ChecksumPolicy, DecodeConfig};
use crate::control::CONTROL_SIZE;
use crate::error::{FormatError, Result};
use crate::heap::{HeapRef, HeapRegion};

/// ACPI signature at offset 0.
pub const NBFT_SIGNATURE: [u8; 4] = *b"NBFT";

/// Size of the packed header record.
pub const HEADER_SIZE: usize = 64;

pub const SUPPORTED_MAJOR_REVISION: u8 = 1;
pub const SUPPORTED_MINOR_REVISION: u8 = 0;

/// Validated table header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub length: u32,
    pub major_revision: u8,
    pub minor_revision: u8,
    pub checksum: u8,
    pub oem_id: String,
    pub oem_table_id: String,
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
    pub heap: HeapRegion,
    pub driver_dev_path_sig: HeapRef,
}

/// Validate the header at offset 0 and return it.
///
/// The signature is checked before anything else is read, so a short
/// buffer with the wrong signature reports `BadSignature`.
pub fn parse_header(buf: &[u8], config: &DecodeConfig) -> Result<Header> {
    let signature: [u8; 4] = read_array(buf, 0)
        .ok_or_else(|| FormatError::truncated("signature", 0, 4, buf.len()))?;
    if signature != NBFT_SIGNATURE {
        return Err(FormatError::BadSignature { found: signature });
    }

    // The control block sits right after the header and both are mandatory.
    slice_checked(buf, 0, (HEADER_SIZE + CONTROL_SIZE) as u64, "header")?;
    let record = Record::<HEADER_SIZE>::new(buf, "header")?;

    let major_revision = record.u8(8);
    let minor_revision = record.u8(50);
    if major_revision != SUPPORTED_MAJOR_REVISION {
        return Err(FormatError::UnsupportedRevision {
            major: major_revision,
            minor: minor_revision,
        });
    }
    if minor_revision != SUPPORTED_MINOR_REVISION {
        if config.strict_minor_revision {
            return Err(FormatError::UnsupportedRevision {
                major: major_revision,
                minor: minor_revision,
            });
        }
        warn!(
            major = major_revision,
            minor = minor_revision,
            "unknown NBFT minor revision, decoding as {}.{}",
            SUPPORTED_MAJOR_REVISION,
            SUPPORTED_MINOR_REVISION
        );
    }

    let heap = HeapRegion {
        offset: record.u32(36),
        length: record.u32(40),
    };
    slice_checked(buf, u64::from(heap.offset), u64::from(heap.length), "heap")?;

    let header = Header {
        length: record.u32(4),
        major_revision,
        minor_revision,
        checksum: record.u8(9),
        oem_id: ascii_field(&record.array::<6>(10)),
        oem_table_id: ascii_field(&record.array::<8>(16)),
        oem_revision: record.u32(24),
        creator_id: record.u32(28),
        creator_revision: record.u32(32),
        heap,
        driver_dev_path_sig: record.heap_ref(44),
    };
    debug!(
        length = header.length,
        heap_offset = heap.offset,
        heap_length = heap.length,
        "NBFT header validated"
    );

    verify_checksum(buf, &header, config.checksum)?;
    Ok(header)
}

/// Apply the checksum policy. ACPI tables sum to zero over `length` bytes.
pub fn verify_checksum(buf: &[u8], header: &Header, policy: ChecksumPolicy) -> Result<()> {
    if policy == ChecksumPolicy::Ignore {
        return Ok(());
    }

    let declared = u64::from(header.length);
    let minimum = (HEADER_SIZE + CONTROL_SIZE) as u64;
    let covered = if declared < minimum {
        // The checksum has to cover at least the header and control block.
        if policy == ChecksumPolicy::Enforce {
            return Err(FormatError::TruncatedBuffer {
                what: "table",
                offset: 0,
                needed: minimum,
                available: declared,
            });
        }
        warn!(
            declared = header.length,
            minimum, "declared table length shorter than header, checksumming buffer"
        );
        buf
    } else {
        match slice_checked(buf, 0, declared, "table") {
            Ok(bytes) => bytes,
            Err(err) if policy == ChecksumPolicy::Enforce => return Err(err),
            Err(_) => {
                warn!(
                    declared = header.length,
                    available = buf.len(),
                    "table length exceeds buffer, checksumming available bytes"
                );
                buf
            }
        }
    };

    let sum = covered.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum == 0 {
        return Ok(());
    }
    match policy {
        ChecksumPolicy::Enforce => Err(FormatError::ChecksumMismatch { sum }),
        _ => {
            warn!(sum, "NBFT checksum mismatch");
            Ok(())
        }
    }
}

/// OEM identifiers are fixed-width, NUL or space padded.
fn ascii_field(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}
