//! The license record and its feature map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version stamped into every issued record.
pub const RECORD_VERSION: &str = "1.0.0";

/// A feature entitlement: either an on/off flag or a numeric limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Feature {
    /// Boolean feature flag.
    Flag(bool),
    /// Numeric usage limit.
    Limit(u64),
}

impl Feature {
    /// True when the entitlement grants any access: an enabled flag or a
    /// non-zero limit.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Flag(on) => *on,
            Self::Limit(n) => *n > 0,
        }
    }
}

/// The default entitlements for a newly issued license.
#[must_use]
pub fn default_features() -> BTreeMap<String, Feature> {
    BTreeMap::from([
        ("ai_chat".to_string(), Feature::Flag(true)),
        ("voice_support".to_string(), Feature::Flag(false)),
        ("api_access".to_string(), Feature::Flag(false)),
        ("max_requests_per_day".to_string(), Feature::Limit(1000)),
    ])
}

/// One issued license: the signed set of terms a license key represents.
///
/// The `signature` field is a shared-secret digest covering every other
/// field; a record whose signature does not verify is untrusted and
/// none of its fields may be acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Unique license identifier.
    pub license_id: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer email address.
    pub customer_email: String,
    /// When the license was issued.
    pub issue_date: DateTime<Utc>,
    /// When the license expires.
    pub expiry_date: DateTime<Utc>,
    /// Maximum concurrent users.
    pub max_users: u32,
    /// Feature entitlements, keyed by feature name.
    pub features: BTreeMap<String, Feature>,
    /// Whether validation must match the hardware signature.
    pub hardware_bound: bool,
    /// Digest of the issuing machine's hardware fingerprint.
    pub hardware_signature: String,
    /// Record schema version.
    pub version: String,
    /// Shared-secret digest over every other field. Empty only while a
    /// record is being assembled, before signing.
    #[serde(default)]
    pub signature: String,
}
