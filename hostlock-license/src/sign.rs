//! Shared-secret signing of license records.
//!
//! A signature is the SHA-256 hex digest of the canonical key-sorted
//! JSON form of a record (minus any existing signature field)
//! concatenated with a shared secret. This detects tampering but is not
//! asymmetric cryptography: anyone holding the secret can mint a valid
//! signature, which is an accepted constraint of this protocol.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;

/// Placeholder secret that ships in sample configurations. Never valid.
pub const INSECURE_PLACEHOLDER_SECRET: &str = "your-secret-key-here";

/// A validated shared signing secret.
///
/// Construction rejects missing, empty, and placeholder values, so a
/// misconfigured service refuses to start instead of signing with a
/// guessable secret.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Validates and wraps a secret.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingSecret`] for an empty value and
    /// [`LicenseError::InsecureSecret`] for the known placeholder.
    pub fn new(secret: impl Into<String>) -> LicenseResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(LicenseError::MissingSecret);
        }
        if secret == INSECURE_PLACEHOLDER_SECRET {
            return Err(LicenseError::InsecureSecret);
        }
        Ok(Self(secret))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets never appear in logs or debug output.
        f.write_str("SigningSecret(..)")
    }
}

/// Computes the signature for a record under the given secret.
///
/// Deterministic: the same record and secret always produce the same
/// digest, and any single-field change produces a different one.
///
/// # Errors
///
/// Returns a serialization error if the record cannot be converted to
/// JSON.
pub fn sign_record(record: &LicenseRecord, secret: &SigningSecret) -> LicenseResult<String> {
    let payload = canonical_payload(record)?;
    Ok(digest_with_secret(&payload, secret))
}

/// Verifies a record's stored signature against a recomputation.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidSignature`] on mismatch.
pub fn verify_record(record: &LicenseRecord, secret: &SigningSecret) -> LicenseResult<()> {
    let expected = sign_record(record, secret)?;
    if record.signature != expected {
        return Err(LicenseError::InvalidSignature);
    }
    Ok(())
}

/// Canonical signing input: key-sorted JSON of the record without its
/// signature field. `serde_json`'s default map is ordered, so the byte
/// sequence is stable across field declaration order.
pub(crate) fn canonical_payload(record: &LicenseRecord) -> LicenseResult<String> {
    let mut value = serde_json::to_value(record)?;
    if let Some(fields) = value.as_object_mut() {
        fields.remove("signature");
    }
    Ok(value.to_string())
}

pub(crate) fn digest_with_secret(payload: &str, secret: &SigningSecret) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
