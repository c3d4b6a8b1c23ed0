//! License validation and hardware binding for Hostlock.
//!
//! This crate handles:
//! - License record issuance and shared-secret signing
//! - License key encoding, parsing, and signature verification
//! - Expiry and hardware-binding checks
//! - Environment-backed configuration with fail-fast secret validation
//!
//! # Design Principles
//!
//! - **Fail closed, never crash**: every check surfaces a
//!   [`Validation`] value with a reason; nothing panics across the
//!   crate boundary.
//! - **Verify before trust**: no field of a license key is read until
//!   the signature over its payload has been recomputed and matched.
//! - **No hidden state**: the [`LicenseManager`] is constructed
//!   explicitly from a [`LicenseConfig`] and injected by the caller;
//!   there is no process-wide instance.
//!
//! # License Key Format
//!
//! Keys are formatted as: `base64url(payload).signature`
//! The payload is the canonical key-sorted JSON of the record (minus
//! its signature field); the signature is a SHA-256 hex digest over the
//! payload bytes concatenated with a shared secret. This is tamper
//! detection under a shared secret, not asymmetric cryptography.

mod config;
mod error;
mod key;
mod manager;
mod record;
mod sign;

pub use config::{LicenseConfig, LICENSE_KEY_VAR, LICENSE_SECRET_VAR};
pub use error::{LicenseError, LicenseResult};
pub use key::{encode_key, parse_key};
pub use manager::{IssueOptions, LicenseManager, Validation};
pub use record::{default_features, Feature, LicenseRecord, RECORD_VERSION};
pub use sign::{sign_record, verify_record, SigningSecret, INSECURE_PLACEHOLDER_SECRET};
