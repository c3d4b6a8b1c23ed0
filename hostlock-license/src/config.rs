//! Environment-backed configuration for the license core.

use std::env;

use crate::error::LicenseResult;
use crate::sign::SigningSecret;

/// Environment variable holding the license key to validate.
pub const LICENSE_KEY_VAR: &str = "LICENSE_KEY";

/// Environment variable holding the shared signing secret.
pub const LICENSE_SECRET_VAR: &str = "LICENSE_SECRET";

/// Configuration consumed by [`crate::LicenseManager`].
///
/// Built by the application's startup path and injected explicitly;
/// nothing in this crate reads configuration behind the caller's back.
#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// The license key to validate, if one is configured.
    pub license_key: Option<String>,
    /// Shared secret used to sign and verify records.
    pub secret: SigningSecret,
}

impl LicenseConfig {
    /// Creates a configuration from explicit values.
    #[must_use]
    pub fn new(license_key: Option<String>, secret: SigningSecret) -> Self {
        Self {
            license_key,
            secret,
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails fast when `LICENSE_SECRET` is unset, empty, or the known
    /// insecure placeholder, so a misconfigured deployment stops at
    /// startup rather than running with a guessable secret.
    pub fn from_env() -> LicenseResult<Self> {
        let license_key = env::var(LICENSE_KEY_VAR).ok().filter(|key| !key.is_empty());
        let secret = SigningSecret::new(env::var(LICENSE_SECRET_VAR).unwrap_or_default())?;
        Ok(Self {
            license_key,
            secret,
        })
    }
}
