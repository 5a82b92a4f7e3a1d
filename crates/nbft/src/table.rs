//! Whole-table entry point.

use tracing::{info, instrument};

use crate::array::{Descriptor, DescriptorArray};
use crate::bytes::slice_checked;
use crate::config::DecodeConfig;
use crate::control::ControlBlock;
use crate::descriptor::{
    DiscoveryDescriptor, HfiDescriptor, HostDescriptor, SecurityDescriptor, SsnsDescriptor,
};
use crate::error::{HeapField, Result};
use crate::header::{parse_header, Header};
use crate::heap::Heap;
use crate::report::NbftReport;

/// A validated NBFT table borrowing its buffer.
///
/// Construction runs the fatal checks (signature, revision, heap bounds,
/// checksum policy, control block). Descriptor arrays are bounds-checked
/// when requested.
#[derive(Debug, Clone)]
pub struct Nbft<'a> {
    buf: &'a [u8],
    header: Header,
    control: ControlBlock,
}

impl<'a> Nbft<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        Self::parse_with(buf, &DecodeConfig::default())
    }

    #[instrument(skip(buf, config), fields(len = buf.len()))]
    pub fn parse_with(buf: &'a [u8], config: &DecodeConfig) -> Result<Self> {
        let header = parse_header(buf, config)?;
        let control = ControlBlock::parse(buf)?;
        info!(
            length = header.length,
            oem_id = %header.oem_id,
            oem_table_id = %header.oem_table_id,
            hfi = control.hfi.count,
            ssns = control.ssns.count,
            "NBFT table parsed"
        );
        Ok(Self {
            buf,
            header,
            control,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn control(&self) -> &ControlBlock {
        &self.control
    }

    pub fn heap(&self) -> Heap<'a> {
        Heap::new(self.buf, self.header.heap)
    }

    /// Decode the single host descriptor.
    pub fn host(&self) -> Result<HostDescriptor> {
        let bytes = slice_checked(
            self.buf,
            u64::from(self.control.host.offset),
            HostDescriptor::SIZE as u64,
            HostDescriptor::KIND,
        )?;
        HostDescriptor::decode(bytes, &self.heap())
    }

    pub fn hfis(&self) -> Result<DescriptorArray<'a, HfiDescriptor>> {
        DescriptorArray::from_locator(self.buf, self.heap(), &self.control.hfi)
    }

    pub fn ssns(&self) -> Result<DescriptorArray<'a, SsnsDescriptor>> {
        DescriptorArray::from_locator(self.buf, self.heap(), &self.control.ssns)
    }

    pub fn security(&self) -> Result<DescriptorArray<'a, SecurityDescriptor>> {
        DescriptorArray::from_locator(self.buf, self.heap(), &self.control.security)
    }

    pub fn discovery(&self) -> Result<DescriptorArray<'a, DiscoveryDescriptor>> {
        DescriptorArray::from_locator(self.buf, self.heap(), &self.control.discovery)
    }

    /// Driver device path signature bytes referenced by the header.
    pub fn driver_dev_path_sig(&self) -> HeapField<Vec<u8>> {
        self.heap().resolve(self.header.driver_dev_path_sig)
    }

    /// Decode everything into an owned report. Array-level failures are
    /// recorded per array so sibling arrays are still decoded.
    pub fn report(&self) -> NbftReport {
        NbftReport::build(self)
    }
}
