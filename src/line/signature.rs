//! HMAC-SHA256 webhook signatures
//!
//! LINE signs each webhook body with the channel secret and sends the
//! base64-encoded digest in the `x-line-signature` header.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Sign a body with the channel secret and return the base64 signature
#[must_use]
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(digest(channel_secret, body))
}

/// Verify a base64 signature against a body
///
/// Malformed base64 is treated as a mismatch.
#[must_use]
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    // Constant-time comparison
    mac.verify_slice(&decoded).is_ok()
}

fn digest(channel_secret: &str, body: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail here
    HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map(|mut mac| {
            mac.update(body);
            mac.finalize().into_bytes().to_vec()
        })
        .unwrap_or_default()
}
