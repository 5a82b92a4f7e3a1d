//! Bounds-safe decoder for the ACPI NVMe Boot Firmware Table (NBFT).
//!
//! Firmware publishes the NBFT to tell the OS which NVMe-over-Fabrics
//! subsystems it booted from and how the host interfaces were configured.
//! The table is untrusted input: every offset and length it declares is
//! checked against the buffer before it is followed.
//!
//! Failures come in two scopes:
//! - header problems (signature, revision, heap bounds, checksum under
//!   [`ChecksumPolicy::Enforce`]) abort [`Nbft::parse`];
//! - heap references that fall outside the heap fail only the field that
//!   holds them, see [`HeapField`]. A descriptor array that runs past the
//!   buffer fails only that array.
//!
//! ```no_run
//! # fn run(bytes: &[u8]) -> nbft::Result<()> {
//! let table = nbft::Nbft::parse(bytes)?;
//! for hfi in table.hfis()?.iter() {
//!     if let Some(tcp) = hfi?.tcp() {
//!         println!("{}/{}", tcp.ip_address, tcp.subnet_mask_prefix);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod addr;
pub mod array;
pub(crate) mod bytes;
pub mod config;
pub mod control;
pub mod descriptor;
pub mod error;
pub mod header;
pub mod heap;
pub mod report;
pub mod table;

pub use addr::{decode_ip, format_mac};
pub use array::{Descriptor, DescriptorArray, DescriptorIter};
pub use config::{ChecksumPolicy, DecodeConfig};
pub use control::{ArrayLocator, ControlBlock, HostLocator};
pub use descriptor::{
    DiscoveryDescriptor, HfiDescriptor, HfiTcpTransport, HfiTransport, HostDescriptor,
    HostIdentity, IpOrigin, NamespaceAvailability, NidType, PrimaryAdminHost, SecretType,
    SecurityDescriptor, SecurityPolicyList, SsnsDescriptor, SsnsExtendedInfo, Support,
};
pub use error::{FormatError, HeapField, Result};
pub use header::{parse_header, verify_checksum, Header};
pub use heap::{Heap, HeapRef, HeapRegion};
pub use report::{ArrayReport, NbftReport};
pub use table::Nbft;
