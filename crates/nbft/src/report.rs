//! Owned, serializable view of a decoded table.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::addr::format_mac;
use crate::array::{Descriptor, DescriptorArray};
use crate::control::ControlBlock;
use crate::descriptor::{
    DiscoveryDescriptor, HfiDescriptor, HfiTransport, HostDescriptor, SecurityDescriptor,
    SsnsDescriptor,
};
use crate::error::{HeapField, Result};
use crate::header::Header;
use crate::table::Nbft;

/// Serialize a heap field as `{"value": ..}` or `{"error": ".."}`.
pub(crate) fn heap_field<T, S>(
    field: &HeapField<T>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(1))?;
    match field {
        Ok(value) => map.serialize_entry("value", value)?,
        Err(err) => map.serialize_entry("error", &err.to_string())?,
    }
    map.end()
}

/// One descriptor array after decoding.
///
/// `error` is set when the array extent was rejected or a record failed to
/// decode. Records decoded before the failure are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayReport<T> {
    pub count: usize,
    pub entries: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Descriptor> ArrayReport<T> {
    fn collect(array: Result<DescriptorArray<'_, T>>) -> Self {
        let array = match array {
            Ok(array) => array,
            Err(err) => {
                warn!(kind = T::KIND, error = %err, "descriptor array rejected");
                return Self {
                    count: 0,
                    entries: Vec::new(),
                    error: Some(err.to_string()),
                };
            }
        };

        let mut entries = Vec::with_capacity(array.len());
        let mut error = None;
        for entry in &array {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(kind = T::KIND, error = %err, "descriptor decode failed");
                    error = Some(err.to_string());
                    break;
                }
            }
        }
        Self {
            count: array.len(),
            entries,
            error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything decodable from one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NbftReport {
    pub header: Header,
    pub control: ControlBlock,
    /// Hex encoding of the header's driver device path signature.
    #[serde(serialize_with = "heap_field")]
    pub driver_dev_path_sig: HeapField<String>,
    #[serde(serialize_with = "heap_field")]
    pub host: HeapField<HostDescriptor>,
    pub hfi: ArrayReport<HfiDescriptor>,
    pub ssns: ArrayReport<SsnsDescriptor>,
    pub security: ArrayReport<SecurityDescriptor>,
    pub discovery: ArrayReport<DiscoveryDescriptor>,
}

impl NbftReport {
    pub(crate) fn build(table: &Nbft<'_>) -> Self {
        NbftReport {
            header: table.header().clone(),
            control: *table.control(),
            driver_dev_path_sig: table.driver_dev_path_sig().map(hex::encode),
            host: table.host(),
            hfi: ArrayReport::collect(table.hfis()),
            ssns: ArrayReport::collect(table.ssns()),
            security: ArrayReport::collect(table.security()),
            discovery: ArrayReport::collect(table.discovery()),
        }
    }

    /// True when no array, host or header heap field recorded an error.
    pub fn is_complete(&self) -> bool {
        self.driver_dev_path_sig.is_ok()
            && self.host.is_ok()
            && self.hfi.is_ok()
            && self.ssns.is_ok()
            && self.security.is_ok()
            && self.discovery.is_ok()
    }
}

fn text<T: fmt::Display>(value: &HeapField<T>) -> String {
    match value {
        Ok(value) => value.to_string(),
        Err(err) => format!("<error: {err}>"),
    }
}

fn array_error<T>(f: &mut fmt::Formatter<'_>, label: &str, array: &ArrayReport<T>) -> fmt::Result {
    match &array.error {
        Some(err) => writeln!(f, "NBFT {label}: <error: {err}>"),
        None => Ok(()),
    }
}

/// One line per header field group and per descriptor.
impl fmt::Display for NbftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.header;
        let control = &self.control;

        writeln!(f, "NBFT table, len {}", header.length)?;
        writeln!(
            f,
            "NBFT OEM '{}' table '{}'",
            header.oem_id, header.oem_table_id
        )?;
        writeln!(
            f,
            "NBFT Heap offset {} len {}",
            header.heap.offset, header.heap.length
        )?;
        if !matches!(&self.driver_dev_path_sig, Ok(sig) if sig.is_empty()) {
            writeln!(
                f,
                "NBFT driver dev path sig {}",
                text(&self.driver_dev_path_sig)
            )?;
        }
        writeln!(
            f,
            "NBFT control len {} #HFI {} #NS {} #SEC {} #DISC {}",
            control.length,
            control.hfi.count,
            control.ssns.count,
            control.security.count,
            control.discovery.count
        )?;

        match &self.host {
            Ok(host) => writeln!(
                f,
                "NBFT host: id {} nqn {}",
                host.identity,
                host.display_nqn()
            )?,
            Err(err) => writeln!(f, "NBFT host: <error: {err}>")?,
        }

        for hfi in &self.hfi.entries {
            writeln!(
                f,
                "NBFT HFI {}: transport {} flags {:#04x}",
                hfi.index, hfi.transport_type, hfi.flags
            )?;
            match &hfi.transport {
                Ok(Some(HfiTransport::Tcp(tcp))) => {
                    writeln!(
                        f,
                        "NBFT HFI {} TCP: {}/{} gateway {} mac {} pci {} origin {:?}",
                        tcp.hfi_index,
                        tcp.ip_address,
                        tcp.subnet_mask_prefix,
                        tcp.gateway,
                        format_mac(&tcp.mac),
                        tcp.pci_address(),
                        tcp.ip_origin
                    )?;
                    if matches!(&tcp.host_name, Ok(name) if !name.is_empty()) {
                        writeln!(
                            f,
                            "NBFT HFI {} host name {}",
                            tcp.hfi_index,
                            text(&tcp.host_name)
                        )?;
                    }
                }
                Ok(Some(HfiTransport::Opaque { bytes, .. })) => {
                    writeln!(f, "NBFT HFI {} transport info {} bytes", hfi.index, bytes.len())?;
                }
                Ok(None) => writeln!(f, "NBFT HFI {} transport info absent", hfi.index)?,
                Err(err) => writeln!(f, "NBFT HFI {} transport <error: {err}>", hfi.index)?,
            }
        }
        array_error(f, "HFI", &self.hfi)?;

        for ssns in &self.ssns.entries {
            writeln!(
                f,
                "NBFT SSNS {}: traddr {} trsvcid {} nqn {} nsid {}",
                ssns.index,
                text(&ssns.transport_address),
                text(&ssns.transport_svcid),
                text(&ssns.subsystem_nqn),
                ssns.nsid
            )?;
            if let Some(nid) = ssns.nid_string() {
                writeln!(f, "NBFT SSNS {} nid {:?} {}", ssns.index, ssns.nid_type, nid)?;
            }
        }
        array_error(f, "SSNS", &self.ssns)?;

        for sec in &self.security.entries {
            writeln!(
                f,
                "NBFT SEC {}: flags {:#06x} secret {:?}",
                sec.index, sec.flags, sec.secret_type
            )?;
        }
        array_error(f, "SEC", &self.security)?;

        for disc in &self.discovery.entries {
            writeln!(
                f,
                "NBFT DISC {}: hfi {} uri {} nqn {}",
                disc.index,
                disc.hfi_index,
                text(&disc.controller_address),
                text(&disc.controller_nqn)
            )?;
        }
        array_error(f, "DISC", &self.discovery)
    }
}
