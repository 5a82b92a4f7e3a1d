//! Little-endian field accessors over untrusted table bytes.
//!
//! Two layers:
//! - [`slice_checked`] and [`read_array`] operate on the whole buffer and
//!   report out-of-range requests instead of panicking.
//! - [`Record`] wraps a slice already proven to be exactly `N` bytes long
//!   and reads fields at fixed offsets inside it. Offsets passed to a
//!   `Record` are layout constants, never values taken from the table.

use crate::error::{FormatError, Result};
use crate::heap::HeapRef;

/// Read `N` raw bytes at `offset`, or `None` when out of bounds.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    buf.get(offset..end)?.try_into().ok()
}

/// Borrow `len` bytes at `offset`, failing with `TruncatedBuffer`.
///
/// Arithmetic is done in `u64` so that table-supplied values cannot wrap.
pub(crate) fn slice_checked<'a>(
    buf: &'a [u8],
    offset: u64,
    len: u64,
    what: &'static str,
) -> Result<&'a [u8]> {
    let end = offset.saturating_add(len);
    if end > buf.len() as u64 {
        return Err(FormatError::truncated(what, offset, len, buf.len()));
    }
    // Both bounds are <= buf.len() which fits in usize.
    buf.get(offset as usize..end as usize)
        .ok_or_else(|| FormatError::truncated(what, offset, len, buf.len()))
}

/// A fixed-size packed record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Record<'a, const N: usize> {
    bytes: &'a [u8; N],
}

impl<'a, const N: usize> Record<'a, N> {
    /// Wrap the first `N` bytes of `bytes`, failing when fewer are available.
    pub(crate) fn new(bytes: &'a [u8], what: &'static str) -> Result<Self> {
        let head = bytes
            .get(..N)
            .ok_or_else(|| FormatError::truncated(what, 0, N as u64, bytes.len()))?;
        let bytes = head
            .try_into()
            .map_err(|_| FormatError::truncated(what, 0, N as u64, bytes.len()))?;
        Ok(Self { bytes })
    }

    pub(crate) fn array<const M: usize>(&self, offset: usize) -> [u8; M] {
        let mut out = [0u8; M];
        out.copy_from_slice(&self.bytes[offset..offset + M]);
        out
    }

    pub(crate) fn u8(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    pub(crate) fn u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.array(offset))
    }

    pub(crate) fn u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.array(offset))
    }

    /// Heap references are stored as `u32 offset, u16 length`.
    pub(crate) fn heap_ref(&self, offset: usize) -> HeapRef {
        HeapRef::new(self.u32(offset), u32::from(self.u16(offset + 4)))
    }
}
