//! Token passport generation
//!
//! Implements the SuiteTalk token-based auth signature: an HMAC-SHA256 over
//! `account&consumer_key&token_key&nonce&timestamp`, keyed with
//! `consumer_secret&token_secret`, base64-encoded.

use crate::config::TapConfig;
use crate::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm name carried on the passport header, exactly as the
/// endpoint validates it (hyphenated, unlike the hash crate's naming).
pub const SIGNATURE_ALGORITHM: &str = "HMAC-SHA256";

/// A time-boxed authentication credential for one outbound call.
#[derive(Debug, Clone)]
pub struct TokenPassport {
    /// Account id as configured (not hostname-normalized)
    pub account: String,
    /// Integration consumer key
    pub consumer_key: String,
    /// Token key
    pub token: String,
    /// 20 random decimal digits
    pub nonce: String,
    /// Unix time in whole seconds
    pub timestamp: u64,
    /// Base64-encoded HMAC-SHA256 digest
    pub signature: String,
}

impl TokenPassport {
    /// Generate a fresh passport for one call.
    ///
    /// The nonce comes from a non-cryptographic random source; uniqueness,
    /// not secrecy, is the goal, and combining it with the timestamp keeps
    /// collisions harmless.
    pub fn generate(config: &TapConfig) -> Result<Self> {
        config.validate()?;

        let nonce = generate_nonce();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let signature = sign(config, &nonce, timestamp);

        Ok(Self {
            account: config.account.clone(),
            consumer_key: config.consumer_key.clone(),
            token: config.token_key.clone(),
            nonce,
            timestamp,
            signature,
        })
    }
}

/// 20 random decimal digits.
fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..20)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Compute the passport signature for the given nonce and timestamp.
fn sign(config: &TapConfig, nonce: &str, timestamp: u64) -> String {
    let key = format!("{}&{}", config.consumer_secret, config.token_secret);
    let message = [
        config.account.as_str(),
        config.consumer_key.as_str(),
        config.token_key.as_str(),
        nonce,
        &timestamp.to_string(),
    ]
    .join("&");

    // HMAC accepts keys of any length; new_from_slice cannot fail here
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
pub(crate) fn sign_for_test(config: &TapConfig, nonce: &str, timestamp: u64) -> String {
    sign(config, nonce, timestamp)
}
