//! Control block: where every descriptor array lives.

use serde::Serialize;
use tracing::debug;

use crate::bytes::{slice_checked, Record};
use crate::error::Result;

/// Structural offset of the control block (immediately after the header).
pub const CONTROL_OFFSET: usize = 64;

/// Size of the packed control record.
pub const CONTROL_SIZE: usize = 64;

pub const CONTROL_FLAG_VALID: u8 = 0x01;

/// Location of the single host descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostLocator {
    pub offset: u32,
    pub length: u16,
    pub version: u8,
}

/// Location of a descriptor array. Not validated until iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrayLocator {
    pub offset: u32,
    /// Per-element length declared by firmware.
    pub length: u16,
    pub version: u8,
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlBlock {
    pub structure_id: u8,
    pub major_revision: u8,
    pub minor_revision: u8,
    pub length: u16,
    pub flags: u8,
    pub host: HostLocator,
    pub hfi: ArrayLocator,
    pub ssns: ArrayLocator,
    pub security: ArrayLocator,
    pub discovery: ArrayLocator,
}

impl ControlBlock {
    /// Read the control block at its fixed offset.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let bytes = slice_checked(
            buf,
            CONTROL_OFFSET as u64,
            CONTROL_SIZE as u64,
            "control block",
        )?;
        let record = Record::<CONTROL_SIZE>::new(bytes, "control block")?;

        let array_at = |offset: usize| ArrayLocator {
            offset: record.u32(offset),
            length: record.u16(offset + 4),
            version: record.u8(offset + 6),
            count: record.u8(offset + 7),
        };

        let control = ControlBlock {
            structure_id: record.u8(0),
            major_revision: record.u8(1),
            minor_revision: record.u8(2),
            length: record.u16(4),
            flags: record.u8(6),
            host: HostLocator {
                offset: record.u32(8),
                length: record.u16(12),
                version: record.u8(14),
            },
            hfi: array_at(16),
            ssns: array_at(24),
            security: array_at(32),
            discovery: array_at(40),
        };
        debug!(
            length = control.length,
            hfi = control.hfi.count,
            ssns = control.ssns.count,
            security = control.security.count,
            discovery = control.discovery.count,
            "NBFT control block read"
        );
        Ok(control)
    }

    pub fn is_valid(&self) -> bool {
        self.flags & CONTROL_FLAG_VALID != 0
    }
}
