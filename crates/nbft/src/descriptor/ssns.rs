//! Subsystem and namespace descriptors.

use serde::Serialize;
use uuid::Uuid;

use crate::array::Descriptor;
use crate::bytes::Record;
use crate::error::{HeapField, Result};
use crate::heap::{Heap, HeapRef};

pub const SSNS_DESC_SIZE: usize = 128;
pub const SSNS_EXT_INFO_SIZE: usize = 18;

pub const SSNS_FLAG_VALID: u16 = 0x0001;
pub const SSNS_FLAG_NON_BOOTABLE_ENTRY: u16 = 0x0002;
pub const SSNS_FLAG_USE_SECURITY_FIELD: u16 = 0x0004;
pub const SSNS_FLAG_DHCP_ROOT_PATH_OVERRIDE: u16 = 0x0008;
pub const SSNS_FLAG_EXTENDED_INFO_IN_USE: u16 = 0x0010;
pub const SSNS_FLAG_SEPARATE_DISCOVERY_CTRL: u16 = 0x0020;
pub const SSNS_FLAG_DISCOVERED_NAMESPACE: u16 = 0x0040;
const SSNS_FLAG_UNAVAILABLE_MASK: u16 = 0x0180;

pub const SSNS_TCP_FLAG_VALID: u16 = 0x01;
pub const SSNS_TCP_FLAG_PDU_HEADER_DIGEST: u16 = 0x02;
pub const SSNS_TCP_FLAG_DATA_DIGEST: u16 = 0x04;

pub const SSNS_EXT_FLAG_VALID: u32 = 0x01;
pub const SSNS_EXT_FLAG_ADMIN_ASQSZ: u32 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceAvailability {
    NotIndicated,
    Available,
    Unavailable,
    Reserved,
}

/// Namespace identifier type (NVMe NIDT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NidType {
    None,
    Eui64,
    Nguid,
    Uuid,
    Unknown(u8),
}

impl From<u8> for NidType {
    fn from(value: u8) -> Self {
        match value {
            0 => NidType::None,
            1 => NidType::Eui64,
            2 => NidType::Nguid,
            3 => NidType::Uuid,
            other => NidType::Unknown(other),
        }
    }
}

/// Extended information attached to an SSNS descriptor through the heap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsnsExtendedInfo {
    pub structure_id: u8,
    pub version: u8,
    pub ssns_index: u16,
    pub flags: u32,
    pub controller_id: u16,
    pub asqsz: u16,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub dhcp_root_path: HeapField<String>,
}

impl SsnsExtendedInfo {
    pub fn decode(bytes: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<SSNS_EXT_INFO_SIZE>::new(bytes, "SSNS extended info")?;
        let dhcp_root_path_ref = record.heap_ref(12);
        Ok(SsnsExtendedInfo {
            structure_id: record.u8(0),
            version: record.u8(1),
            ssns_index: record.u16(2),
            flags: record.u32(4),
            controller_id: record.u16(8),
            asqsz: record.u16(10),
            dhcp_root_path: heap.resolve_string(dhcp_root_path_ref),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.flags & SSNS_EXT_FLAG_VALID != 0
    }

    /// The admin submission queue size only applies when flagged.
    pub fn admin_asqsz(&self) -> Option<u16> {
        (self.flags & SSNS_EXT_FLAG_ADMIN_ASQSZ != 0).then_some(self.asqsz)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsnsDescriptor {
    pub structure_id: u8,
    pub index: u16,
    pub flags: u16,
    pub transport_type: u8,
    pub transport_flags: u16,
    pub primary_discovery_ctrl_index: u8,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub transport_address: HeapField<String>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub transport_svcid: HeapField<String>,
    pub port_id: u16,
    pub nsid: u32,
    pub nid_type: NidType,
    pub nid: [u8; 16],
    pub security_index: u8,
    pub primary_hfi_index: u8,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub secondary_hfi_indices: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub subsystem_nqn: HeapField<String>,
    /// `Ok(None)` when no extended info record is referenced.
    #[serde(serialize_with = "crate::report::heap_field")]
    pub extended_info: HeapField<Option<SsnsExtendedInfo>>,
}

impl SsnsDescriptor {
    pub fn is_valid(&self) -> bool {
        self.flags & SSNS_FLAG_VALID != 0
    }

    pub fn is_bootable(&self) -> bool {
        self.flags & SSNS_FLAG_NON_BOOTABLE_ENTRY == 0
    }

    pub fn uses_security_descriptor(&self) -> bool {
        self.flags & SSNS_FLAG_USE_SECURITY_FIELD != 0
    }

    pub fn dhcp_root_path_override(&self) -> bool {
        self.flags & SSNS_FLAG_DHCP_ROOT_PATH_OVERRIDE != 0
    }

    pub fn extended_info_in_use(&self) -> bool {
        self.flags & SSNS_FLAG_EXTENDED_INFO_IN_USE != 0
    }

    pub fn separate_discovery_ctrl(&self) -> bool {
        self.flags & SSNS_FLAG_SEPARATE_DISCOVERY_CTRL != 0
    }

    pub fn discovered_namespace(&self) -> bool {
        self.flags & SSNS_FLAG_DISCOVERED_NAMESPACE != 0
    }

    pub fn availability(&self) -> NamespaceAvailability {
        match (self.flags & SSNS_FLAG_UNAVAILABLE_MASK) >> 7 {
            0 => NamespaceAvailability::NotIndicated,
            1 => NamespaceAvailability::Available,
            2 => NamespaceAvailability::Unavailable,
            _ => NamespaceAvailability::Reserved,
        }
    }

    pub fn pdu_header_digest(&self) -> bool {
        self.transport_flags & SSNS_TCP_FLAG_PDU_HEADER_DIGEST != 0
    }

    pub fn data_digest(&self) -> bool {
        self.transport_flags & SSNS_TCP_FLAG_DATA_DIGEST != 0
    }

    /// Namespace identifier in its conventional text form, if any.
    pub fn nid_string(&self) -> Option<String> {
        match self.nid_type {
            NidType::None => None,
            NidType::Eui64 => Some(hex::encode(&self.nid[..8])),
            NidType::Nguid | NidType::Unknown(_) => Some(hex::encode(self.nid)),
            NidType::Uuid => Some(Uuid::from_bytes(self.nid).hyphenated().to_string()),
        }
    }
}

fn decode_extended_info(
    ext_ref: HeapRef,
    heap: &Heap<'_>,
) -> HeapField<Option<SsnsExtendedInfo>> {
    if ext_ref.is_empty() {
        return Ok(None);
    }
    let bytes = heap.resolve_slice(ext_ref)?;
    SsnsExtendedInfo::decode(bytes, heap).map(Some)
}

impl Descriptor for SsnsDescriptor {
    const KIND: &'static str = "SSNS descriptor";
    const SIZE: usize = SSNS_DESC_SIZE;

    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<SSNS_DESC_SIZE>::new(record, Self::KIND)?;
        Ok(SsnsDescriptor {
            structure_id: record.u8(0),
            index: record.u16(1),
            flags: record.u16(3),
            transport_type: record.u8(5),
            transport_flags: record.u16(6),
            primary_discovery_ctrl_index: record.u8(8),
            transport_address: heap.resolve_string(record.heap_ref(10)),
            transport_svcid: heap.resolve_string(record.heap_ref(16)),
            port_id: record.u16(22),
            nsid: record.u32(24),
            nid_type: NidType::from(record.u8(28)),
            nid: record.array(29),
            security_index: record.u8(45),
            primary_hfi_index: record.u8(46),
            secondary_hfi_indices: heap.resolve_indices(record.heap_ref(48)),
            subsystem_nqn: heap.resolve_string(record.heap_ref(54)),
            extended_info: decode_extended_info(record.heap_ref(60), heap),
        })
    }
}
