//! Host Fabric Interface descriptors and their transport records.

use std::net::IpAddr;

use serde::Serialize;
use tracing::debug;

use crate::addr::decode_ip;
use crate::array::Descriptor;
use crate::bytes::Record;
use crate::error::{HeapField, Result};
use crate::heap::{Heap, HeapRef};

pub const HFI_DESC_SIZE: usize = 32;
pub const HFI_TCP_INFO_SIZE: usize = 128;

/// NVMe transport type for TCP.
pub const TRANSPORT_TYPE_TCP: u8 = 3;

pub const HFI_FLAG_VALID: u8 = 0x01;

pub const TCP_FLAG_VALID: u8 = 0x01;
pub const TCP_FLAG_GLOBAL_ROUTE: u8 = 0x02;
pub const TCP_FLAG_DHCP_OVERRIDE: u8 = 0x04;

/// How the interface address was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IpOrigin {
    Other,
    Manual,
    WellKnown,
    Dhcp,
    RouterAdvertisement,
    Unchanged,
    Unknown(u8),
}

impl From<u8> for IpOrigin {
    fn from(value: u8) -> Self {
        match value {
            0 => IpOrigin::Other,
            1 => IpOrigin::Manual,
            2 => IpOrigin::WellKnown,
            3 => IpOrigin::Dhcp,
            4 => IpOrigin::RouterAdvertisement,
            16 => IpOrigin::Unchanged,
            other => IpOrigin::Unknown(other),
        }
    }
}

/// TCP transport parameters of one HFI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HfiTcpTransport {
    pub structure_id: u8,
    pub version: u8,
    pub transport_type: u8,
    pub transport_info_version: u8,
    pub hfi_index: u16,
    pub flags: u8,
    pub pci_sbdf: u32,
    pub mac: [u8; 6],
    pub vlan: u16,
    pub ip_origin: IpOrigin,
    pub ip_address: IpAddr,
    pub subnet_mask_prefix: u8,
    pub gateway: IpAddr,
    pub route_metric: u16,
    pub primary_dns: IpAddr,
    pub secondary_dns: IpAddr,
    pub dhcp_server: IpAddr,
    #[serde(serialize_with = "crate::report::heap_field")]
    pub host_name: HeapField<String>,
}

impl HfiTcpTransport {
    /// Decode the record found in the heap. Short records are truncated.
    pub fn decode(bytes: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<HFI_TCP_INFO_SIZE>::new(bytes, "HFI TCP transport")?;
        let host_name_ref = record.heap_ref(104);
        Ok(HfiTcpTransport {
            structure_id: record.u8(0),
            version: record.u8(1),
            transport_type: record.u8(2),
            transport_info_version: record.u8(3),
            hfi_index: record.u16(4),
            flags: record.u8(6),
            pci_sbdf: record.u32(7),
            mac: record.array(11),
            vlan: record.u16(17),
            ip_origin: IpOrigin::from(record.u8(19)),
            ip_address: decode_ip(record.array(20)),
            subnet_mask_prefix: record.u8(36),
            gateway: decode_ip(record.array(37)),
            route_metric: record.u16(54),
            primary_dns: decode_ip(record.array(56)),
            secondary_dns: decode_ip(record.array(72)),
            dhcp_server: decode_ip(record.array(88)),
            host_name: heap.resolve_string(host_name_ref),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.flags & TCP_FLAG_VALID != 0
    }

    pub fn global_route(&self) -> bool {
        self.flags & TCP_FLAG_GLOBAL_ROUTE != 0
    }

    pub fn dhcp_override(&self) -> bool {
        self.flags & TCP_FLAG_DHCP_OVERRIDE != 0
    }

    /// `segment:bus:device.function` form of [`Self::pci_sbdf`].
    pub fn pci_address(&self) -> String {
        let sbdf = self.pci_sbdf;
        format!(
            "{:04x}:{:02x}:{:02x}.{:x}",
            sbdf >> 16,
            (sbdf >> 8) & 0xff,
            (sbdf >> 3) & 0x1f,
            sbdf & 0x7
        )
    }
}

/// Transport-specific information attached to an HFI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HfiTransport {
    Tcp(HfiTcpTransport),
    /// A transport type without a defined layout; bytes are kept as-is.
    Opaque { transport_type: u8, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HfiDescriptor {
    pub structure_id: u8,
    pub index: u8,
    pub flags: u8,
    pub transport_type: u8,
    /// `Ok(None)` when no transport record is referenced.
    #[serde(serialize_with = "crate::report::heap_field")]
    pub transport: HeapField<Option<HfiTransport>>,
}

impl HfiDescriptor {
    pub fn is_valid(&self) -> bool {
        self.flags & HFI_FLAG_VALID != 0
    }

    pub fn tcp(&self) -> Option<&HfiTcpTransport> {
        match &self.transport {
            Ok(Some(HfiTransport::Tcp(tcp))) => Some(tcp),
            _ => None,
        }
    }
}

fn decode_transport(
    transport_type: u8,
    transport_ref: HeapRef,
    heap: &Heap<'_>,
) -> HeapField<Option<HfiTransport>> {
    if transport_ref.is_empty() {
        return Ok(None);
    }
    let bytes = heap.resolve_slice(transport_ref)?;
    if transport_type == TRANSPORT_TYPE_TCP {
        return HfiTcpTransport::decode(bytes, heap).map(|tcp| Some(HfiTransport::Tcp(tcp)));
    }
    debug!(transport_type, "HFI transport without a known layout");
    Ok(Some(HfiTransport::Opaque {
        transport_type,
        bytes: bytes.to_vec(),
    }))
}

impl Descriptor for HfiDescriptor {
    const KIND: &'static str = "HFI descriptor";
    const SIZE: usize = HFI_DESC_SIZE;

    fn decode(record: &[u8], heap: &Heap<'_>) -> Result<Self> {
        let record = Record::<HFI_DESC_SIZE>::new(record, Self::KIND)?;
        let transport_type = record.u8(3);
        let transport_ref = record.heap_ref(16);
        Ok(HfiDescriptor {
            structure_id: record.u8(0),
            index: record.u8(1),
            flags: record.u8(2),
            transport_type,
            transport: decode_transport(transport_type, transport_ref, heap),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::heap::HeapRegion;

    const HEAP_OFFSET: usize = 32;

    fn tcp_record() -> [u8; HFI_TCP_INFO_SIZE] {
        let mut rec = [0u8; HFI_TCP_INFO_SIZE];
        rec[0] = 7;
        rec[1] = 1;
        rec[2] = TRANSPORT_TYPE_TCP;
        rec[4..6].copy_from_slice(&1u16.to_le_bytes());
        rec[6] = TCP_FLAG_VALID | TCP_FLAG_DHCP_OVERRIDE;
        rec[7..11].copy_from_slice(&0x0001_0213u32.to_le_bytes());
        rec[11..17].copy_from_slice(&[0x52, 0x54, 0, 0x12, 0x34, 0x56]);
        rec[17..19].copy_from_slice(&100u16.to_le_bytes());
        rec[19] = 3;
        rec[30..32].copy_from_slice(&[0xff, 0xff]);
        rec[32..36].copy_from_slice(&[10, 0, 0, 5]);
        rec[36] = 24;
        rec[47..49].copy_from_slice(&[0xff, 0xff]);
        rec[49..53].copy_from_slice(&[10, 0, 0, 1]);
        rec[54..56].copy_from_slice(&500u16.to_le_bytes());
        rec[56] = 0xfe;
        rec[57] = 0x80;
        rec[71] = 0x53;
        rec
    }

    fn table(transport_type: u8, transport_len: u16) -> Vec<u8> {
        let mut buf = vec![0u8; HEAP_OFFSET + HFI_TCP_INFO_SIZE + 8];
        buf[1] = 4;
        buf[2] = HFI_FLAG_VALID;
        buf[3] = transport_type;
        buf[16..20].copy_from_slice(&(HEAP_OFFSET as u32).to_le_bytes());
        buf[20..22].copy_from_slice(&transport_len.to_le_bytes());
        buf[HEAP_OFFSET..HEAP_OFFSET + HFI_TCP_INFO_SIZE].copy_from_slice(&tcp_record());
        buf
    }

    fn heap(buf: &[u8]) -> Heap<'_> {
        Heap::new(
            buf,
            HeapRegion {
                offset: HEAP_OFFSET as u32,
                length: (buf.len() - HEAP_OFFSET) as u32,
            },
        )
    }

    #[test]
    fn test_tcp_transport_dispatch() {
        let buf = table(TRANSPORT_TYPE_TCP, HFI_TCP_INFO_SIZE as u16);
        let hfi = HfiDescriptor::decode(&buf[..HFI_DESC_SIZE], &heap(&buf)).unwrap();
        assert!(hfi.is_valid());
        assert_eq!(hfi.index, 4);

        let tcp = hfi.tcp().expect("tcp transport");
        assert!(tcp.is_valid());
        assert!(tcp.dhcp_override());
        assert!(!tcp.global_route());
        assert_eq!(tcp.hfi_index, 1);
        assert_eq!(tcp.pci_address(), "0001:02:02.3");
        assert_eq!(tcp.vlan, 100);
        assert_eq!(tcp.ip_origin, IpOrigin::Dhcp);
        assert_eq!(tcp.ip_address.to_string(), "10.0.0.5");
        assert_eq!(tcp.subnet_mask_prefix, 24);
        assert_eq!(tcp.gateway.to_string(), "10.0.0.1");
        assert_eq!(tcp.route_metric, 500);
        assert_eq!(tcp.primary_dns.to_string(), "fe80::53");
        assert_eq!(tcp.host_name, Ok(String::new()));
    }

    #[test]
    fn test_unknown_transport_is_opaque() {
        let buf = table(1, 8);
        let hfi = HfiDescriptor::decode(&buf[..HFI_DESC_SIZE], &heap(&buf)).unwrap();
        assert!(hfi.tcp().is_none());
        match hfi.transport {
            Ok(Some(HfiTransport::Opaque {
                transport_type,
                bytes,
            })) => {
                assert_eq!(transport_type, 1);
                assert_eq!(bytes.len(), 8);
                assert_eq!(bytes[0], 7);
            }
            other => panic!("unexpected transport {other:?}"),
        }
    }

    #[test]
    fn test_short_tcp_record_is_truncated() {
        let buf = table(TRANSPORT_TYPE_TCP, 64);
        let hfi = HfiDescriptor::decode(&buf[..HFI_DESC_SIZE], &heap(&buf)).unwrap();
        assert!(matches!(
            hfi.transport,
            Err(FormatError::TruncatedBuffer {
                what: "HFI TCP transport",
                needed: 128,
                available: 64,
                ..
            })
        ));
    }

    #[test]
    fn test_absent_tcp_transport() {
        let mut buf = table(TRANSPORT_TYPE_TCP, 0);
        buf[16..20].copy_from_slice(&0u32.to_le_bytes());
        let hfi = HfiDescriptor::decode(&buf[..HFI_DESC_SIZE], &heap(&buf)).unwrap();
        assert_eq!(hfi.transport, Ok(None));
        assert!(hfi.tcp().is_none());
    }

    #[test]
    fn test_transport_outside_heap() {
        let mut buf = table(TRANSPORT_TYPE_TCP, HFI_TCP_INFO_SIZE as u16);
        buf[16..20].copy_from_slice(&0u32.to_le_bytes());
        let hfi = HfiDescriptor::decode(&buf[..HFI_DESC_SIZE], &heap(&buf)).unwrap();
        assert!(matches!(
            hfi.transport,
            Err(FormatError::HeapOffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_ip_origin_values() {
        assert_eq!(IpOrigin::from(16), IpOrigin::Unchanged);
        assert_eq!(IpOrigin::from(9), IpOrigin::Unknown(9));
    }
}
