mod common;

use chrono::{Duration, Utc};
use common::{issued_record, issuer, manager_with_key, resign_and_encode, test_secret};
use hostlock_license::{
    encode_key, sign_record, Feature, IssueOptions, LicenseConfig, LicenseManager, RECORD_VERSION,
};
use sha2::{Digest, Sha256};

// ── Issuance ─────────────────────────────────────────────────────

#[test]
fn generated_record_has_expected_defaults() {
    let record = issuer()
        .generate_license("Acme", "a@acme.com", IssueOptions::default())
        .unwrap();

    assert_eq!(record.customer_name, "Acme");
    assert_eq!(record.customer_email, "a@acme.com");
    assert_eq!(record.max_users, 1);
    assert!(record.hardware_bound);
    assert!(!record.hardware_signature.is_empty());
    assert!(!record.signature.is_empty());
    assert_eq!(record.version, RECORD_VERSION);
    assert_eq!(record.features.get("ai_chat"), Some(&Feature::Flag(true)));
    assert_eq!(
        record.features.get("voice_support"),
        Some(&Feature::Flag(false))
    );
    assert_eq!(
        record.features.get("max_requests_per_day"),
        Some(&Feature::Limit(1000))
    );
}

#[test]
fn generated_record_signature_reproduces() {
    let record = issued_record(30);
    let resigned = sign_record(&record, &test_secret()).unwrap();
    assert_eq!(record.signature, resigned);
}

#[test]
fn expiry_window_is_applied() {
    let record = issued_record(30);
    let window = record.expiry_date - record.issue_date;
    assert_eq!(window.num_days(), 30);
}

#[test]
fn custom_features_override_defaults() {
    let features = std::collections::BTreeMap::from([
        ("bulk_export".to_string(), Feature::Flag(true)),
        ("seats".to_string(), Feature::Limit(25)),
    ]);
    let record = issuer()
        .generate_license(
            "Acme",
            "a@acme.com",
            IssueOptions {
                features: Some(features.clone()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(record.features, features);
    assert!(!record.features.contains_key("ai_chat"));
}

#[test]
fn license_ids_are_unique_per_issuance() {
    let a = issued_record(30);
    let b = issued_record(30);
    assert_ne!(a.license_id, b.license_id);
}

// ── check_license: fail-closed paths ─────────────────────────────

#[test]
fn no_key_fails_closed() {
    let manager = LicenseManager::new(LicenseConfig::new(None, test_secret()));
    let validation = manager.check_license();
    assert!(!validation.is_valid);
    assert_eq!(validation.message, "No license key provided");
}

#[test]
fn malformed_key_is_reported() {
    let manager = manager_with_key("garbage");
    let validation = manager.check_license();
    assert!(!validation.is_valid);
    assert!(validation.message.contains("invalid license key format"));
}

#[test]
fn tampered_key_is_reported_as_invalid_signature() {
    let key = encode_key(&issued_record(30)).unwrap();
    let parts: Vec<&str> = key.split('.').collect();
    let tampered = format!("{}.{}", parts[0], "0".repeat(64));
    let validation = manager_with_key(&tampered).check_license();
    assert!(!validation.is_valid);
    assert_eq!(validation.message, "license signature invalid");
}

// ── check_license: expiry ────────────────────────────────────────

#[test]
fn expired_one_second_ago_is_expired() {
    let mut record = issued_record(30);
    record.expiry_date = Utc::now() - Duration::seconds(1);
    let validation = manager_with_key(&resign_and_encode(record)).check_license();
    assert!(!validation.is_valid);
    assert_eq!(validation.message, "License has expired");
}

#[test]
fn valid_for_one_more_day_is_valid() {
    let key = encode_key(&issued_record(1)).unwrap();
    let validation = manager_with_key(&key).check_license();
    assert!(validation.is_valid, "{}", validation.message);
    assert_eq!(validation.message, "License is valid");
}

// ── check_license: hardware binding ──────────────────────────────

#[test]
fn end_to_end_valid_on_issuing_machine() {
    let key = encode_key(&issued_record(30)).unwrap();
    let validation = manager_with_key(&key).check_license();
    assert!(validation.is_valid, "{}", validation.message);
    assert_eq!(validation.message, "License is valid");
}

#[test]
fn foreign_hardware_signature_is_rejected() {
    let mut record = issued_record(30);
    record.hardware_signature = hex::encode(Sha256::digest(b"some other machine"));
    let validation = manager_with_key(&resign_and_encode(record)).check_license();
    assert!(!validation.is_valid);
    assert_eq!(validation.message, "License is not valid for this hardware");
}

#[test]
fn unbound_license_skips_hardware_check() {
    let mut record = issued_record(30);
    record.hardware_bound = false;
    record.hardware_signature = hex::encode(Sha256::digest(b"some other machine"));
    let validation = manager_with_key(&resign_and_encode(record)).check_license();
    assert!(validation.is_valid, "{}", validation.message);
}

// ── Feature queries ──────────────────────────────────────────────

#[test]
fn features_come_from_the_validated_record() {
    let key = encode_key(&issued_record(30)).unwrap();
    let manager = manager_with_key(&key);

    let features = manager.features().expect("record should have validated");
    assert!(features.contains_key("ai_chat"));

    assert!(manager.is_feature_enabled("ai_chat"));
    assert!(!manager.is_feature_enabled("voice_support"));
    // Non-zero limits count as enabled.
    assert!(manager.is_feature_enabled("max_requests_per_day"));
    assert!(!manager.is_feature_enabled("no_such_feature"));
}

#[test]
fn no_license_means_no_features() {
    let manager = LicenseManager::new(LicenseConfig::new(None, test_secret()));
    assert!(manager.features().is_none());
    assert!(manager.record().is_none());
    assert!(!manager.is_feature_enabled("ai_chat"));
}

#[test]
fn bad_key_means_no_cached_record() {
    let manager = manager_with_key("garbage");
    assert!(manager.record().is_none());
    assert!(manager.features().is_none());
}

#[test]
fn valid_key_caches_record_at_construction() {
    let record = issued_record(30);
    let key = encode_key(&record).unwrap();
    let manager = manager_with_key(&key);
    assert_eq!(manager.record(), Some(&record));
}

// ── Validation value ─────────────────────────────────────────────

#[test]
fn validation_serializes_for_http_collaborators() {
    let manager = LicenseManager::new(LicenseConfig::new(None, test_secret()));
    let validation = manager.check_license();
    let json = serde_json::to_value(&validation).unwrap();
    assert_eq!(json["is_valid"], false);
    assert_eq!(json["message"], "No license key provided");
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_checks_agree() {
    let key = encode_key(&issued_record(30)).unwrap();
    let manager = std::sync::Arc::new(manager_with_key(&key));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            std::thread::spawn(move || manager.check_license().is_valid)
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
