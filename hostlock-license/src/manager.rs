//! License lifecycle: issuance, validation, expiry, hardware binding.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

use hostlock_hwid::HardwareId;

use crate::config::LicenseConfig;
use crate::error::LicenseResult;
use crate::key::parse_key;
use crate::record::{default_features, Feature, LicenseRecord, RECORD_VERSION};
use crate::sign::{sign_record, SigningSecret};

/// Outcome of a license check: validity plus a human-readable reason.
///
/// Ephemeral by design; callers translate it into their own surface
/// (an HTTP 403 carrying the message, a CLI exit code) and discard it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Whether the license passed every check.
    pub is_valid: bool,
    /// Why, in one sentence.
    pub message: String,
}

impl Validation {
    fn valid(message: &str) -> Self {
        Self {
            is_valid: true,
            message: message.to_string(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Issuance parameters for [`LicenseManager::generate_license`].
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// Days until the license expires.
    pub expiry_days: i64,
    /// Maximum concurrent users.
    pub max_users: u32,
    /// Feature entitlements; the default set is used when `None`.
    pub features: Option<BTreeMap<String, Feature>>,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            expiry_days: 365,
            max_users: 1,
            features: None,
        }
    }
}

/// Owns one configured license and answers validity questions about it.
///
/// Constructed once by the application's startup routine and shared by
/// reference. All methods take `&self` and mutate nothing, so
/// concurrent checks from parallel request handlers are safe; each call
/// re-derives the hardware fingerprint and validation state.
pub struct LicenseManager {
    license_key: Option<String>,
    secret: SigningSecret,
    license_data: Option<LicenseRecord>,
}

impl LicenseManager {
    /// Builds a manager from configuration, parsing and verifying the
    /// configured key up front when one is present.
    ///
    /// A key that fails verification leaves the cached record empty;
    /// the failure reason resurfaces from [`check_license`].
    ///
    /// [`check_license`]: Self::check_license
    #[must_use]
    pub fn new(config: LicenseConfig) -> Self {
        let license_data = config.license_key.as_deref().and_then(|key| {
            match parse_key(key, &config.secret) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(%err, "configured license key failed verification");
                    None
                }
            }
        });

        Self {
            license_key: config.license_key,
            secret: config.secret,
            license_data,
        }
    }

    /// Issues a new signed license bound to the current machine.
    ///
    /// Pure apart from probing the hardware: the record is returned,
    /// not stored anywhere. Persistence and distribution are the
    /// caller's concern.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the record cannot be signed.
    pub fn generate_license(
        &self,
        customer_name: &str,
        customer_email: &str,
        options: IssueOptions,
    ) -> LicenseResult<LicenseRecord> {
        let now = Utc::now();
        let mut record = LicenseRecord {
            license_id: generate_license_id(customer_name, now),
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
            issue_date: now,
            expiry_date: now + Duration::days(options.expiry_days),
            max_users: options.max_users,
            features: options.features.unwrap_or_else(default_features),
            hardware_bound: true,
            hardware_signature: hardware_signature(),
            version: RECORD_VERSION.to_string(),
            signature: String::new(),
        };
        record.signature = sign_record(&record, &self.secret)?;
        Ok(record)
    }

    /// Checks the configured license: presence, signature, expiry, and
    /// hardware binding, in that order.
    ///
    /// Fails closed: no configured key is invalid, and every internal
    /// failure becomes a [`Validation`] with a reason rather than a
    /// panic or an error escaping to the caller.
    #[must_use]
    pub fn check_license(&self) -> Validation {
        let Some(key) = self.license_key.as_deref() else {
            return Validation::invalid("No license key provided");
        };

        let record = match parse_key(key, &self.secret) {
            Ok(record) => record,
            Err(err) => return Validation::invalid(err.to_string()),
        };

        if Utc::now() > record.expiry_date {
            return Validation::invalid("License has expired");
        }

        if record.hardware_bound && hardware_signature() != record.hardware_signature {
            return Validation::invalid("License is not valid for this hardware");
        }

        Validation::valid("License is valid")
    }

    /// The verified record, when the configured key parsed cleanly at
    /// construction.
    #[must_use]
    pub fn record(&self) -> Option<&LicenseRecord> {
        self.license_data.as_ref()
    }

    /// Entitlements of the validated license, when there is one.
    #[must_use]
    pub fn features(&self) -> Option<&BTreeMap<String, Feature>> {
        self.license_data.as_ref().map(|record| &record.features)
    }

    /// Whether the named feature is granted by the validated license.
    ///
    /// Absent features, numeric limits of zero, and the no-license case
    /// all answer `false`.
    #[must_use]
    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.features()
            .and_then(|features| features.get(name))
            .is_some_and(Feature::is_enabled)
    }
}

/// License ids are a digest over the customer, the issue instant, and a
/// random token. Uniqueness is probabilistic, which is acceptable: a
/// collision would require a duplicated UUID at the same instant.
fn generate_license_id(customer_name: &str, now: DateTime<Utc>) -> String {
    let seed = format!("{customer_name}-{}-{}", now.to_rfc3339(), Uuid::new_v4());
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// The hardware signature stored in records: a digest of the machine
/// fingerprint rather than the fingerprint itself.
fn hardware_signature() -> String {
    hex::encode(Sha256::digest(HardwareId::current().as_str().as_bytes()))
}
