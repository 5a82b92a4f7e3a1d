//! Synthetic NBFT tables for integration tests.

#![allow(dead_code)]

pub const HEADER_SIZE: usize = 64;
pub const CONTROL_OFFSET: usize = 64;
pub const DESCRIPTORS_OFFSET: usize = 128;

pub const HOST_SIZE: usize = 32;
pub const HFI_SIZE: usize = 32;
pub const TCP_INFO_SIZE: usize = 128;
pub const SSNS_SIZE: usize = 128;
pub const SECURITY_SIZE: usize = 64;
pub const DISCOVERY_SIZE: usize = 32;

/// Control-block slot of each descriptor array.
#[derive(Debug, Clone, Copy)]
pub enum Slot {
    Hfi,
    Ssns,
    Security,
    Discovery,
}

impl Slot {
    fn control_offset(self) -> usize {
        CONTROL_OFFSET
            + match self {
                Slot::Hfi => 16,
                Slot::Ssns => 24,
                Slot::Security => 32,
                Slot::Discovery => 40,
            }
    }

    fn record_size(self) -> usize {
        match self {
            Slot::Hfi => HFI_SIZE,
            Slot::Ssns => SSNS_SIZE,
            Slot::Security => SECURITY_SIZE,
            Slot::Discovery => DISCOVERY_SIZE,
        }
    }
}

pub fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_ref(buf: &mut [u8], at: usize, heap_ref: (u32, u16)) {
    put_u32(buf, at, heap_ref.0);
    put_u16(buf, at + 4, heap_ref.1);
}

/// `::ffff:a.b.c.d`
pub fn mapped_v4(octets: [u8; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[10] = 0xff;
    out[11] = 0xff;
    out[12..].copy_from_slice(&octets);
    out
}

/// Lays out header, control block, host descriptor, arrays and heap.
///
/// Descriptors start right after the control block; the heap starts at a
/// fixed offset so heap references can be handed out before `build`.
pub struct TableBuilder {
    heap_offset: u32,
    host: [u8; HOST_SIZE],
    hfi: Vec<Vec<u8>>,
    ssns: Vec<Vec<u8>>,
    security: Vec<Vec<u8>>,
    discovery: Vec<Vec<u8>>,
    heap: Vec<u8>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::with_heap_at(1024)
    }
}

impl TableBuilder {
    pub fn with_heap_at(heap_offset: u32) -> Self {
        let mut host = [0u8; HOST_SIZE];
        host[0] = 2;
        Self {
            heap_offset,
            host,
            hfi: Vec::new(),
            ssns: Vec::new(),
            security: Vec::new(),
            discovery: Vec::new(),
            heap: Vec::new(),
        }
    }

    /// Append to the heap and return the absolute reference.
    pub fn heap(&mut self, bytes: &[u8]) -> (u32, u16) {
        let offset = self.heap_offset + self.heap.len() as u32;
        self.heap.extend_from_slice(bytes);
        (offset, bytes.len() as u16)
    }

    pub fn pad_heap(&mut self, len: usize) {
        self.heap.resize(len, 0);
    }

    pub fn host(&mut self, flags: u8, id: [u8; 16], nqn: &str) -> &mut Self {
        let nqn_ref = self.heap(nqn.as_bytes());
        self.host[1] = flags;
        self.host[2..18].copy_from_slice(&id);
        put_ref(&mut self.host, 18, nqn_ref);
        self
    }

    /// One HFI with a TCP transport record in the heap.
    pub fn tcp_hfi(&mut self, index: u8, ip: [u8; 16], prefix: u8, host_name: &str) -> &mut Self {
        let host_name_ref = self.heap(host_name.as_bytes());

        let mut info = vec![0u8; TCP_INFO_SIZE];
        info[0] = 3;
        info[1] = 1;
        info[2] = 3;
        info[3] = 1;
        put_u16(&mut info, 4, u16::from(index));
        info[6] = 0x01;
        put_u32(&mut info, 7, 0x0000_1808);
        info[11..17].copy_from_slice(&[0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        info[19] = 1;
        info[20..36].copy_from_slice(&ip);
        info[36] = prefix;
        info[37..53].copy_from_slice(&mapped_v4([192, 168, 1, 254]));
        put_ref(&mut info, 104, host_name_ref);
        let info_ref = self.heap(&info);

        let mut record = vec![0u8; HFI_SIZE];
        record[0] = 3;
        record[1] = index;
        record[2] = 0x01;
        record[3] = 3;
        put_ref(&mut record, 16, info_ref);
        self.hfi.push(record);
        self
    }

    pub fn ssns(&mut self, index: u16, traddr: &str, svcid: &str, nqn: &str) -> &mut Self {
        let traddr_ref = self.heap(traddr.as_bytes());
        let svcid_ref = self.heap(svcid.as_bytes());
        let nqn_ref = self.heap(nqn.as_bytes());

        let mut record = vec![0u8; SSNS_SIZE];
        record[0] = 4;
        put_u16(&mut record, 1, index);
        put_u16(&mut record, 3, 0x0001);
        record[5] = 3;
        put_ref(&mut record, 10, traddr_ref);
        put_ref(&mut record, 16, svcid_ref);
        put_u32(&mut record, 24, 1);
        record[46] = 1;
        put_ref(&mut record, 54, nqn_ref);
        self.ssns.push(record);
        self
    }

    pub fn security(&mut self, index: u8) -> &mut Self {
        let mut record = vec![0u8; SECURITY_SIZE];
        record[0] = 5;
        record[1] = index;
        put_u16(&mut record, 2, 0x0001);
        self.security.push(record);
        self
    }

    pub fn discovery(&mut self, index: u8, address: &str, nqn: &str) -> &mut Self {
        let address_ref = self.heap(address.as_bytes());
        let nqn_ref = self.heap(nqn.as_bytes());

        let mut record = vec![0u8; DISCOVERY_SIZE];
        record[0] = 6;
        record[1] = 0x01;
        record[2] = index;
        record[3] = 1;
        put_ref(&mut record, 6, address_ref);
        put_ref(&mut record, 12, nqn_ref);
        self.discovery.push(record);
        self
    }

    /// Raw access for tests that need malformed records.
    pub fn raw_discovery(&mut self, record: Vec<u8>) -> &mut Self {
        self.discovery.push(record);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let heap_offset = self.heap_offset as usize;
        let total = heap_offset + self.heap.len();
        let mut buf = vec![0u8; total];

        buf[0..4].copy_from_slice(b"NBFT");
        put_u32(&mut buf, 4, total as u32);
        buf[8] = 1;
        buf[10..16].copy_from_slice(b"ACME  ");
        buf[16..24].copy_from_slice(b"NBFTTEST");
        put_u32(&mut buf, 24, 1);
        put_u32(&mut buf, 36, self.heap_offset);
        put_u32(&mut buf, 40, self.heap.len() as u32);

        let control = CONTROL_OFFSET;
        buf[control] = 1;
        buf[control + 1] = 1;
        put_u16(&mut buf, control + 4, 64);
        buf[control + 6] = 0x01;

        let mut cursor = DESCRIPTORS_OFFSET;
        put_u32(&mut buf, control + 8, cursor as u32);
        put_u16(&mut buf, control + 12, HOST_SIZE as u16);
        buf[control + 14] = 1;
        buf[cursor..cursor + HOST_SIZE].copy_from_slice(&self.host);
        cursor += HOST_SIZE;

        for (slot, records) in [
            (Slot::Hfi, &self.hfi),
            (Slot::Ssns, &self.ssns),
            (Slot::Security, &self.security),
            (Slot::Discovery, &self.discovery),
        ] {
            let at = slot.control_offset();
            put_u32(&mut buf, at, cursor as u32);
            put_u16(&mut buf, at + 4, slot.record_size() as u16);
            buf[at + 6] = 1;
            buf[at + 7] = records.len() as u8;
            for record in records {
                buf[cursor..cursor + record.len()].copy_from_slice(record);
                cursor += record.len();
            }
        }
        assert!(cursor <= heap_offset, "descriptors overlap the heap");

        buf[heap_offset..].copy_from_slice(&self.heap);
        fix_checksum(&mut buf);
        buf
    }
}

/// Overwrite the count of one array in an already built table.
pub fn set_count(buf: &mut [u8], slot: Slot, count: u8) {
    buf[slot.control_offset() + 7] = count;
    fix_checksum(buf);
}

pub fn fix_checksum(buf: &mut [u8]) {
    buf[9] = 0;
    let sum = buf.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    buf[9] = 0u8.wrapping_sub(sum);
}
