//! Tests for token passport generation

use super::passport::sign_for_test;
use super::TokenPassport;
use crate::config::TapConfig;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pretty_assertions::assert_eq;

fn sample_config() -> TapConfig {
    TapConfig::from_json(&serde_json::json!({
        "account": "TSTDRV1749285",
        "consumer_key": "consumer-key",
        "consumer_secret": "consumer-secret",
        "token_key": "token-key",
        "token_secret": "token-secret",
    }))
    .unwrap()
}

#[test]
fn test_algorithm_name_is_hyphenated() {
    // The endpoint rejects any other spelling of the algorithm attribute
    assert_eq!(super::SIGNATURE_ALGORITHM, "HMAC-SHA256");
}

#[test]
fn test_nonce_is_20_decimal_digits() {
    let passport = TokenPassport::generate(&sample_config()).unwrap();
    assert_eq!(passport.nonce.len(), 20);
    assert!(passport.nonce.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_signature_is_valid_base64_of_sha256_digest() {
    let passport = TokenPassport::generate(&sample_config()).unwrap();
    let digest = BASE64.decode(&passport.signature).unwrap();
    assert_eq!(digest.len(), 32);
}

#[test]
fn test_passport_carries_config_fields() {
    let config = sample_config();
    let passport = TokenPassport::generate(&config).unwrap();
    assert_eq!(passport.account, "TSTDRV1749285");
    assert_eq!(passport.consumer_key, "consumer-key");
    assert_eq!(passport.token, "token-key");
    assert!(passport.timestamp > 1_600_000_000);
}

#[test]
fn test_two_passports_never_share_a_signature() {
    // Non-determinism contract: same credentials, different nonce/timestamp,
    // different signature.
    let config = sample_config();
    let a = TokenPassport::generate(&config).unwrap();
    let b = TokenPassport::generate(&config).unwrap();
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.signature, b.signature);
}

#[test]
fn test_signature_is_deterministic_for_fixed_inputs() {
    let config = sample_config();
    let first = sign_for_test(&config, "01234567890123456789", 1_700_000_000);
    let second = sign_for_test(&config, "01234567890123456789", 1_700_000_000);
    assert_eq!(first, second);

    // Changing only the timestamp changes the signature
    let third = sign_for_test(&config, "01234567890123456789", 1_700_000_001);
    assert_ne!(first, third);

    // Changing only the nonce changes the signature
    let fourth = sign_for_test(&config, "98765432109876543210", 1_700_000_000);
    assert_ne!(first, fourth);
}

#[test]
fn test_missing_credential_is_fatal() {
    let mut config = sample_config();
    config.token_secret = String::new();
    let err = TokenPassport::generate(&config).unwrap_err();
    assert!(!err.is_retryable());
}
