//! Discovery controller descriptors.

use serde::Serialize;

use crate::array::Descriptor;
use crate::bytes::Record;
use crate::error::{HeapField, Result};
use crate::heap::Heap;

pub const DISCOVERY_DESC_SIZE: usize = 32;

pub const DISCOVERY_FLAG_VALID: u8 = 0x01;

/// A discovery controller the host may contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDescriptor {
    pub structure_id: u8,
    pub flags: u8,
    pub index: u8,
    pub hfi_index: u8,
    pub security_index: u8,
    /// Controller address as a URI-style string.
    #[serde(serialize_with = "crate::report::heap_field")]
    pub controller_address: HeapField<String>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub controller_nqn: HeapField<String>,
}

impl DiscoveryDescriptor {
    pub fn is_valid(&self) -> bool {
        self.flags & DISCOVERY_FLAG_VALID != 0
    }
}

impl Descriptor for DiscoveryDescriptor {
    const KIND: &'static str = "discovery descriptor";
    const SIZE: usize = DISCOVERY_DESC_SIZE;

    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<DISCOVERY_DESC_SIZE>::new(record, Self::KIND)?;
        Ok(DiscoveryDescriptor {
            structure_id: record.u8(0),
            flags: record.u8(1),
            index: record.u8(2),
            hfi_index: record.u8(3),
            security_index: record.u8(4),
            controller_address: heap.resolve_string(record.heap_ref(6)),
            controller_nqn: heap.resolve_string(record.heap_ref(12)),
        })
    }
}
