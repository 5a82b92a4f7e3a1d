//! Heap object resolution.
//!
//! Every variable-length field in the table (strings, index lists, nested
//! transport and extended-info records) is stored as an offset/length pair
//! pointing into the heap region declared by the header. [`Heap::resolve`]
//! is the only place that turns such a pair into bytes.

use serde::Serialize;
use tracing::warn;

use crate::error::{FormatError, HeapField};

/// The heap bounds declared by the header.
///
/// `offset + length` is checked against the buffer length when the header
/// is parsed, so a `HeapRegion` obtained from [`crate::Header`] always fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeapRegion {
    pub offset: u32,
    pub length: u32,
}

impl HeapRegion {
    /// One past the last heap byte.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }
}

/// An unvalidated reference into the heap as stored in a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HeapRef {
    pub offset: u32,
    pub length: u32,
}

impl HeapRef {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// Zero-length references mark an absent optional field.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Heap resolver bound to one table buffer.
#[derive(Debug, Clone, Copy)]
pub struct Heap<'a> {
    buf: &'a [u8],
    region: HeapRegion,
}

impl<'a> Heap<'a> {
    pub fn new(buf: &'a [u8], region: HeapRegion) -> Self {
        Self { buf, region }
    }

    pub fn region(&self) -> HeapRegion {
        self.region
    }

    /// Copy out the bytes referenced by `heap_ref`.
    ///
    /// A zero length resolves to an empty value whatever the offset.
    pub fn resolve(&self, heap_ref: HeapRef) -> HeapField<Vec<u8>> {
        self.resolve_slice(heap_ref).map(<[u8]>::to_vec)
    }

    /// Resolve a heap string. Trailing NUL padding is dropped and invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn resolve_string(&self, heap_ref: HeapRef) -> HeapField<String> {
        let bytes = self.resolve_slice(heap_ref)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Resolve a list of one-byte descriptor indices.
    pub fn resolve_indices(&self, heap_ref: HeapRef) -> HeapField<Vec<u8>> {
        self.resolve(heap_ref)
    }

    pub(crate) fn resolve_slice(&self, heap_ref: HeapRef) -> HeapField<&'a [u8]> {
        if heap_ref.is_empty() {
            return Ok(&[]);
        }
        if heap_ref.offset < self.region.offset {
            warn!(
                heap_offset = self.region.offset,
                offset = heap_ref.offset,
                "heap offset mismatch"
            );
            return Err(FormatError::HeapOffsetOutOfRange {
                offset: heap_ref.offset,
                heap_offset: self.region.offset,
            });
        }
        let end = u64::from(heap_ref.offset) + u64::from(heap_ref.length);
        if end > self.region.end() {
            warn!(
                heap_offset = self.region.offset,
                heap_length = self.region.length,
                offset = heap_ref.offset,
                length = heap_ref.length,
                "heap length mismatch"
            );
            return Err(FormatError::HeapLengthOutOfRange {
                offset: heap_ref.offset,
                length: heap_ref.length,
                heap_offset: self.region.offset,
                heap_length: self.region.length,
            });
        }
        self.buf
            .get(heap_ref.offset as usize..end as usize)
            .ok_or_else(|| {
                FormatError::truncated(
                    "heap object",
                    u64::from(heap_ref.offset),
                    u64::from(heap_ref.length),
                    self.buf.len(),
                )
            })
    }
}
