//! Host descriptor and the three-way host identity.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::array::Descriptor;
use crate::bytes::Record;
use crate::error::{HeapField, Result};
use crate::heap::Heap;

pub const HOST_DESC_SIZE: usize = 32;

/// Identity bytes firmware uses to mark a host id as present but invalid.
pub const INVALID_HOST_ID: [u8; 16] = [0xff; 16];

pub const HOST_FLAG_VALID: u8 = 0x01;
pub const HOST_FLAG_HOSTID_CONFIGURED: u8 = 0x02;
pub const HOST_FLAG_HOSTNQN_CONFIGURED: u8 = 0x04;
const HOST_FLAG_PRIMARY_ADMIN_MASK: u8 = 0x18;

/// Three-way classification of the 16-byte host identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostIdentity {
    /// All bytes `0xff`.
    Invalid,
    /// All bytes zero.
    Unset,
    Uuid(Uuid),
}

impl HostIdentity {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        if bytes == INVALID_HOST_ID {
            HostIdentity::Invalid
        } else if bytes == [0u8; 16] {
            HostIdentity::Unset
        } else {
            HostIdentity::Uuid(Uuid::from_bytes(bytes))
        }
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostIdentity::Invalid => write!(f, "invalid"),
            HostIdentity::Unset => write!(f, "unset"),
            HostIdentity::Uuid(uuid) => write!(f, "{}", uuid.hyphenated()),
        }
    }
}

impl Serialize for HostIdentity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Primary administrative host designation (flag bits 3..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAdminHost {
    NotIndicated,
    Unselected,
    Selected,
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDescriptor {
    pub structure_id: u8,
    pub flags: u8,
    pub identity: HostIdentity,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub nqn: HeapField<String>,
}

impl HostDescriptor {
    pub fn is_valid(&self) -> bool {
        self.flags & HOST_FLAG_VALID != 0
    }

    pub fn host_id_configured(&self) -> bool {
        self.flags & HOST_FLAG_HOSTID_CONFIGURED != 0
    }

    pub fn host_nqn_configured(&self) -> bool {
        self.flags & HOST_FLAG_HOSTNQN_CONFIGURED != 0
    }

    pub fn primary_admin_host(&self) -> PrimaryAdminHost {
        match (self.flags & HOST_FLAG_PRIMARY_ADMIN_MASK) >> 3 {
            0 => PrimaryAdminHost::NotIndicated,
            1 => PrimaryAdminHost::Unselected,
            2 => PrimaryAdminHost::Selected,
            _ => PrimaryAdminHost::Reserved,
        }
    }

    /// The NQN as shown to operators: a heap error and an empty string
    /// both render as `invalid`. [`Self::nqn`] keeps the distinction.
    pub fn display_nqn(&self) -> &str {
        match &self.nqn {
            Ok(nqn) if !nqn.is_empty() => nqn,
            _ => "invalid",
        }
    }
}

impl Descriptor for HostDescriptor {
    const KIND: &'static str = "host descriptor";
    const SIZE: usize = HOST_DESC_SIZE;

    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<HOST_DESC_SIZE>::new(record, Self::KIND)?;
        let nqn_ref = record.heap_ref(18);
        Ok(HostDescriptor {
            structure_id: record.u8(0),
            flags: record.u8(1),
            identity: HostIdentity::from_bytes(record.array(2)),
            nqn: heap.resolve_string(nqn_ref),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::heap::HeapRegion;

    #[test]
    fn test_identity_classification() {
        assert_eq!(HostIdentity::from_bytes([0xff; 16]).to_string(), "invalid");
        assert_eq!(HostIdentity::from_bytes([0; 16]).to_string(), "unset");

        let bytes = [
            0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab,
            0xcd, 0xef,
        ];
        assert_eq!(
            HostIdentity::from_bytes(bytes).to_string(),
            "12345678-9abc-def0-0123-456789abcdef"
        );

        let mut almost = [0xff; 16];
        almost[15] = 0xfe;
        assert!(matches!(HostIdentity::from_bytes(almost), HostIdentity::Uuid(_)));
    }

    fn host_table(nqn_ref: (u32, u16)) -> Vec<u8> {
        let mut buf = vec![0u8; 96];
        buf[1] = HOST_FLAG_VALID | HOST_FLAG_HOSTNQN_CONFIGURED | 0x10;
        buf[2..18].copy_from_slice(&[0xaa; 16]);
        buf[18..22].copy_from_slice(&nqn_ref.0.to_le_bytes());
        buf[22..24].copy_from_slice(&nqn_ref.1.to_le_bytes());
        buf[64..80].copy_from_slice(b"nqn.2014-08.org\0");
        buf
    }

    const REGION: HeapRegion = HeapRegion {
        offset: 64,
        length: 32,
    };

    #[test]
    fn test_decode_host() {
        let buf = host_table((64, 16));
        let heap = Heap::new(&buf, REGION);
        let host = HostDescriptor::decode(&buf[..32], &heap).unwrap();
        assert!(host.is_valid());
        assert!(!host.host_id_configured());
        assert!(host.host_nqn_configured());
        assert_eq!(host.primary_admin_host(), PrimaryAdminHost::Selected);
        assert_eq!(host.nqn.as_deref(), Ok("nqn.2014-08.org"));
        assert_eq!(host.display_nqn(), "nqn.2014-08.org");
        assert_eq!(host.identity.to_string(), "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa");
    }

    #[test]
    fn test_empty_nqn_renders_invalid() {
        let buf = host_table((0, 0));
        let heap = Heap::new(&buf, REGION);
        let host = HostDescriptor::decode(&buf[..32], &heap).unwrap();
        assert_eq!(host.nqn, Ok(String::new()));
        assert_eq!(host.display_nqn(), "invalid");
    }

    #[test]
    fn test_heap_error_renders_invalid_but_is_kept() {
        let buf = host_table((8, 16));
        let heap = Heap::new(&buf, REGION);
        let host = HostDescriptor::decode(&buf[..32], &heap).unwrap();
        assert!(matches!(host.nqn, Err(FormatError::HeapOffsetOutOfRange { .. })));
        assert_eq!(host.display_nqn(), "invalid");
    }
}
