//! Decoders for each fixed-size descriptor kind.

pub mod discovery;
pub mod hfi;
pub mod host;
pub mod security;
pub mod ssns;

pub use discovery::DiscoveryDescriptor;
pub use hfi::{HfiDescriptor, HfiTcpTransport, HfiTransport, IpOrigin};
pub use host::{HostDescriptor, HostIdentity, PrimaryAdminHost};
pub use security::{SecretType, SecurityDescriptor, SecurityPolicyList, Support};
pub use ssns::{NamespaceAvailability, NidType, SsnsDescriptor, SsnsExtendedInfo};
