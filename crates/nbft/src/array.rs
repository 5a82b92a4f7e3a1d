//! Bounds-checked iteration over descriptor arrays.

use std::fmt;
use std::marker::PhantomData;
use std::slice::ChunksExact;

use tracing::debug;

use crate::bytes::slice_checked;
use crate::control::ArrayLocator;
use crate::error::Result;
use crate::heap::Heap;

/// A fixed-size record kind found in a descriptor array.
pub trait Descriptor: Sized {
    /// Short name used in errors and logs.
    const KIND: &'static str;

    /// Packed record size; also the array stride.
    const SIZE: usize;

    /// Decode one record of exactly [`Self::SIZE`] bytes, resolving
    /// embedded heap fields through `heap`.
    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self>;
}

/// A descriptor array whose full extent has been checked against the buffer.
pub struct DescriptorArray<'a, D> {
    records: &'a [u8],
    heap: Heap<'a>,
    count: usize,
    _kind: PhantomData<fn() -> D>,
}

impl<'a, D: Descriptor> DescriptorArray<'a, D> {
    /// Check `offset + count * D::SIZE <= buf.len()` once for the whole array.
    pub fn new(buf: &'a [u8], heap: Heap<'a>, offset: u32, count: usize) -> Result<Self> {
        let len = (count as u64).saturating_mul(D::SIZE as u64);
        let records = slice_checked(buf, u64::from(offset), len, D::KIND)?;
        Ok(Self {
            records,
            heap,
            count,
            _kind: PhantomData,
        })
    }

    pub fn from_locator(buf: &'a [u8], heap: Heap<'a>, locator: &ArrayLocator) -> Result<Self> {
        if locator.count > 0 && usize::from(locator.length) != D::SIZE {
            debug!(
                kind = D::KIND,
                declared = locator.length,
                record_size = D::SIZE,
                "declared descriptor length differs from record size"
            );
        }
        Self::new(buf, heap, locator.offset, usize::from(locator.count))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Lazily decode the records. Each call starts over from the first one.
    pub fn iter(&self) -> DescriptorIter<'a, D> {
        DescriptorIter {
            records: self.records.chunks_exact(D::SIZE.max(1)),
            heap: self.heap,
            _kind: PhantomData,
        }
    }
}

impl<D> fmt::Debug for DescriptorArray<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorArray")
            .field("count", &self.count)
            .field("bytes", &self.records.len())
            .finish()
    }
}

impl<'a, D: Descriptor> IntoIterator for &DescriptorArray<'a, D> {
    type Item = Result<D>;
    type IntoIter = DescriptorIter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct DescriptorIter<'a, D> {
    records: ChunksExact<'a, u8>,
    heap: Heap<'a>,
    _kind: PhantomData<fn() -> D>,
}

impl<D: Descriptor> Iterator for DescriptorIter<'_, D> {
    type Item = Result<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(D::decode(record, &self.heap))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<D: Descriptor> ExactSizeIterator for DescriptorIter<'_, D> {}
