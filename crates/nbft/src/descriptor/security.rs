//! Security profile descriptors.

use serde::Serialize;

use crate::array::Descriptor;
use crate::bytes::Record;
use crate::error::{HeapField, Result};
use crate::heap::Heap;

pub const SECURITY_DESC_SIZE: usize = 64;

pub const SEC_FLAG_VALID: u16 = 0x0001;
const SEC_FLAG_IN_BAND_AUTH_MASK: u16 = 0x0006;
const SEC_FLAG_AUTH_POLICY_LIST_MASK: u16 = 0x0018;
const SEC_FLAG_SECURE_CHANNEL_MASK: u16 = 0x0060;
const SEC_FLAG_SECURITY_POLICY_LIST_MASK: u16 = 0x0180;
pub const SEC_FLAG_CIPHER_SUITES_RESTRICTED: u16 = 0x0200;
pub const SEC_FLAG_DH_GROUPS_RESTRICTED: u16 = 0x0400;
pub const SEC_FLAG_SECURE_HASH_POLICY_LIST: u16 = 0x0800;

/// Two-bit support field used by several security flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    NotSupported,
    Supported,
    Required,
    Reserved,
}

impl Support {
    fn from_bits(flags: u16, mask: u16) -> Self {
        match (flags & mask) >> mask.trailing_zeros() {
            0 => Support::NotSupported,
            1 => Support::Supported,
            2 => Support::Required,
            _ => Support::Reserved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicyList {
    NotPresent,
    Present,
    PresentAdminSet,
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    Reserved,
    RedfishHostInterfaceUri,
    Unknown(u8),
}

impl From<u8> for SecretType {
    fn from(value: u8) -> Self {
        match value {
            0 => SecretType::Reserved,
            1 => SecretType::RedfishHostInterfaceUri,
            other => SecretType::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDescriptor {
    pub structure_id: u8,
    pub index: u8,
    pub flags: u16,
    pub secret_type: SecretType,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub secure_channel_algorithms: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub authentication_protocols: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub cipher_suites: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub dh_groups: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub secure_hash_functions: HeapField<Vec<u8>>,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub secret_keypath: HeapField<String>,
}

impl SecurityDescriptor {
    pub fn is_valid(&self) -> bool {
        self.flags & SEC_FLAG_VALID != 0
    }

    pub fn in_band_authentication(&self) -> Support {
        Support::from_bits(self.flags, SEC_FLAG_IN_BAND_AUTH_MASK)
    }

    pub fn authentication_policy_list(&self) -> Support {
        Support::from_bits(self.flags, SEC_FLAG_AUTH_POLICY_LIST_MASK)
    }

    pub fn secure_channel_negotiation(&self) -> Support {
        Support::from_bits(self.flags, SEC_FLAG_SECURE_CHANNEL_MASK)
    }

    pub fn security_policy_list(&self) -> SecurityPolicyList {
        match (self.flags & SEC_FLAG_SECURITY_POLICY_LIST_MASK) >> 7 {
            0 => SecurityPolicyList::NotPresent,
            1 => SecurityPolicyList::Present,
            2 => SecurityPolicyList::PresentAdminSet,
            _ => SecurityPolicyList::Reserved,
        }
    }

    pub fn cipher_suites_restricted(&self) -> bool {
        self.flags & SEC_FLAG_CIPHER_SUITES_RESTRICTED != 0
    }

    pub fn dh_groups_restricted(&self) -> bool {
        self.flags & SEC_FLAG_DH_GROUPS_RESTRICTED != 0
    }

    pub fn secure_hash_policy_list(&self) -> bool {
        self.flags & SEC_FLAG_SECURE_HASH_POLICY_LIST != 0
    }
}

impl Descriptor for SecurityDescriptor {
    const KIND: &'static str = "security descriptor";
    const SIZE: usize = SECURITY_DESC_SIZE;

    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<SECURITY_DESC_SIZE>::new(record, Self::KIND)?;
        Ok(SecurityDescriptor {
            structure_id: record.u8(0),
            index: record.u8(1),
            flags: record.u16(2),
            secret_type: SecretType::from(record.u8(4)),
            secure_channel_algorithms: heap.resolve(record.heap_ref(6)),
            authentication_protocols: heap.resolve(record.heap_ref(12)),
            cipher_suites: heap.resolve(record.heap_ref(18)),
            dh_groups: heap.resolve(record.heap_ref(24)),
            secure_hash_functions: heap.resolve(record.heap_ref(30)),
            secret_keypath: heap.resolve_string(record.heap_ref(36)),
        })
    }
}
