//! Error types for the licensing crate.

use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No signing secret configured.
    #[error("no signing secret configured (set LICENSE_SECRET)")]
    MissingSecret,

    /// The configured signing secret is a known placeholder.
    #[error("signing secret is the insecure placeholder value, refusing to use it")]
    InsecureSecret,

    /// License key string is malformed.
    #[error("invalid license key format: {0}")]
    InvalidKeyFormat(String),

    /// Recomputed signature does not match the stored one.
    #[error("license signature invalid")]
    InvalidSignature,

    /// Payload JSON is malformed or missing required fields.
    #[error("invalid license payload: {0}")]
    InvalidPayload(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
