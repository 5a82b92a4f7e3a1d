use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// What to do with the header checksum byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumPolicy {
    /// Do not compute the checksum.
    Ignore,
    /// Compute it and log a warning on mismatch.
    #[default]
    Warn,
    /// Reject tables whose bytes do not sum to zero.
    Enforce,
}

/// Decoder knobs that the table format leaves to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Checksum handling (default: warn).
    pub checksum: ChecksumPolicy,

    /// Reject minor revisions other than the one this decoder knows.
    /// When unset a mismatch is logged and decoding continues.
    pub strict_minor_revision: bool,
}

impl DecodeConfig {
    /// Configuration that fails on every deviation it can detect.
    pub fn strict() -> Self {
        Self {
            checksum: ChecksumPolicy::Enforce,
            strict_minor_revision: true,
        }
    }

    /// Parse a YAML document such as:
    ///
    /// ```yaml
    /// checksum: enforce
    /// strict_minor_revision: true
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| FormatError::invalid_config(err.to_string()))
    }
}
