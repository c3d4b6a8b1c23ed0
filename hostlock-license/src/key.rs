//! Distributable license keys.
//!
//! Wire format: `base64url(payload).signature`
//!
//! The payload is the canonical key-sorted JSON of the record without
//! its signature field; the signature is the shared-secret SHA-256 hex
//! digest over exactly those payload bytes. Parsing verifies the digest
//! before the payload is deserialized, so no record field is trusted
//! until the signature checks out.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use crate::sign::{canonical_payload, digest_with_secret, SigningSecret};

/// Encodes a signed record as a distributable license key string.
///
/// # Errors
///
/// Returns an error if the record has not been signed or cannot be
/// serialized.
pub fn encode_key(record: &LicenseRecord) -> LicenseResult<String> {
    if record.signature.is_empty() {
        return Err(LicenseError::InvalidKeyFormat(
            "record is not signed".to_string(),
        ));
    }
    let payload = canonical_payload(record)?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        record.signature
    ))
}

/// Parses a license key string, verifying its signature under the given
/// secret before any field is deserialized.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidKeyFormat`] for structural problems,
/// [`LicenseError::InvalidSignature`] when the digest over the payload
/// does not match, and [`LicenseError::InvalidPayload`] when the
/// verified payload is not a valid record.
pub fn parse_key(key: &str, secret: &SigningSecret) -> LicenseResult<LicenseRecord> {
    let key = key.trim();
    if key.is_empty() {
        return Err(LicenseError::InvalidKeyFormat(
            "empty license key".to_string(),
        ));
    }

    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(LicenseError::InvalidKeyFormat(
            "key must have exactly two parts separated by a dot".to_string(),
        ));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|e| LicenseError::InvalidKeyFormat(format!("invalid payload base64: {e}")))?;
    let payload = String::from_utf8(payload_bytes)
        .map_err(|_| LicenseError::InvalidKeyFormat("payload is not valid UTF-8".to_string()))?;

    // Verify over the exact payload bytes before deserializing.
    let expected = digest_with_secret(&payload, secret);
    if expected != parts[1] {
        return Err(LicenseError::InvalidSignature);
    }

    let mut record: LicenseRecord = serde_json::from_str(&payload)
        .map_err(|e| LicenseError::InvalidPayload(format!("invalid payload JSON: {e}")))?;
    record.signature = expected;
    Ok(record)
}
