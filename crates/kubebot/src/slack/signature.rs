//! Slack request signature verification.
//!
//! Slack signs `v0:{timestamp}:{body}` with the app's signing secret and
//! sends `v0=<hex digest>` in `X-Slack-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version prefix.
const VERSION: &str = "v0";

fn digest(body: &[u8], timestamp: &str, secret: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Compute the `v0=` signature header value for a request.
#[must_use]
pub fn sign_request(body: &[u8], timestamp: &str, secret: &str) -> Option<String> {
    digest(body, timestamp, secret).map(|d| format!("{VERSION}={}", hex::encode(d)))
}

/// Verify a Slack request signature using HMAC-SHA256.
///
/// # Arguments
/// * `body` - Raw request body bytes
/// * `timestamp` - Value of `X-Slack-Request-Timestamp`
/// * `signature` - Value of `X-Slack-Signature` (`v0=<hex>`)
/// * `secret` - Signing secret
///
/// # Returns
/// `true` if signature is valid, `false` otherwise
#[must_use]
pub fn verify_request_signature(body: &[u8], timestamp: &str, signature: &str, secret: &str) -> bool {
    let Some(hex_digest) = signature.strip_prefix("v0=") else {
        return false;
    };

    let Ok(signature_bytes) = hex::decode(hex_digest) else {
        return false;
    };

    let Some(computed) = digest(body, timestamp, secret) else {
        return false;
    };

    // Constant-time comparison to prevent timing attacks
    computed.as_slice().ct_eq(&signature_bytes).into()
}

/// Validate a request timestamp (seconds) is within `max_age_secs` of `now_secs`.
///
/// The timestamp is untrusted header input, so the distance is computed
/// without overflow for any pair of `i64` values.
#[must_use]
pub fn validate_request_timestamp(timestamp_secs: i64, max_age_secs: i64, now_secs: i64) -> bool {
    now_secs.abs_diff(timestamp_secs) <= max_age_secs.unsigned_abs()
}
