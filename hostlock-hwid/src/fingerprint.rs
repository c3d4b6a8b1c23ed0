//! Fingerprint derivation from the collected attribute snapshot.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::SystemInfo;

/// A machine fingerprint: the SHA-256 of the canonical (key-sorted JSON)
/// form of a [`SystemInfo`] snapshot, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareId(String);

impl HardwareId {
    /// Computes the fingerprint of the current machine from a full
    /// attribute snapshot.
    #[must_use]
    pub fn current() -> Self {
        Self::from_info(&SystemInfo::collect())
    }

    /// Computes the fingerprint for an already-collected snapshot.
    #[must_use]
    pub fn from_info(info: &SystemInfo) -> Self {
        Self(digest_hex(canonical_json(info).as_bytes()))
    }

    /// Reduced fingerprint over the MAC address and disk serial only.
    ///
    /// Cheaper and less sensitive to OS upgrades than [`current`], at the
    /// cost of colliding more easily across cloned virtual machines.
    ///
    /// [`current`]: Self::current
    #[must_use]
    pub fn current_short() -> Self {
        let info = SystemInfo::collect();
        Self(digest_hex(
            format!("{}:{}", info.mac_address, info.disk_serial).as_bytes(),
        ))
    }

    /// Returns the fingerprint as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks a candidate fingerprint against the current machine.
///
/// Empty candidates are always rejected; otherwise the comparison is
/// exact equality against a freshly computed full fingerprint.
#[must_use]
pub fn validate_hardware_id(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    HardwareId::current().as_str() == candidate
}

/// Canonical form of a snapshot: JSON with keys sorted.
///
/// `serde_json`'s default map is ordered, so routing the struct through
/// a `Value` yields the same byte sequence for the same attribute set no
/// matter the field declaration order.
fn canonical_json(info: &SystemInfo) -> String {
    serde_json::to_value(info)
        .expect("SystemInfo serializes to a JSON object")
        .to_string()
}

fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
