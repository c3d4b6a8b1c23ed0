//! Shared test helpers for license tests.

#![allow(dead_code)]

use hostlock_license::{
    encode_key, sign_record, IssueOptions, LicenseConfig, LicenseManager, LicenseRecord,
    SigningSecret,
};

pub const TEST_SECRET: &str = "unit-test-signing-secret";

/// Returns the shared secret used across the test suite.
pub fn test_secret() -> SigningSecret {
    SigningSecret::new(TEST_SECRET).unwrap()
}

/// A manager with no configured key, used for issuing records.
pub fn issuer() -> LicenseManager {
    LicenseManager::new(LicenseConfig::new(None, test_secret()))
}

/// Issues a record for a standard test customer.
pub fn issued_record(expiry_days: i64) -> LicenseRecord {
    issuer()
        .generate_license(
            "Acme",
            "a@acme.com",
            IssueOptions {
                expiry_days,
                ..Default::default()
            },
        )
        .unwrap()
}

/// A manager configured with the given key and the test secret.
pub fn manager_with_key(key: &str) -> LicenseManager {
    LicenseManager::new(LicenseConfig::new(Some(key.to_string()), test_secret()))
}

/// Re-signs a (possibly mutated) record and returns its wire key.
pub fn resign_and_encode(mut record: LicenseRecord) -> String {
    record.signature = sign_record(&record, &test_secret()).unwrap();
    encode_key(&record).unwrap()
}
