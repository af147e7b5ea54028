//! HMAC-SHA256 signing and verification.
//!
//! Both trust boundaries use the same primitive: hex-encoded HMAC-SHA256
//! over exact message bytes. Verification must always run against the raw
//! bytes as received - a re-serialization is not byte-stable and would make
//! the comparison unsound.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 of `payload` under `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded signature against `payload`.
///
/// Uses constant-time comparison to prevent timing attacks: an attacker could
/// otherwise measure response times to progressively discover the correct
/// signature byte-by-byte. Anything that is not the exact lowercase hex
/// digest - wrong length, uppercase, non-hex garbage - fails verification.
/// There is no error path here; a signature either matches or it does not.
pub fn verify_signature(secret: &str, payload: &[u8], provided: &str) -> bool {
    let expected = compute_signature(secret, payload);

    // Length check is not constant-time, but the signature length is not
    // secret (always 64 hex chars for SHA-256).
    if expected.len() != provided.len() {
        return false;
    }

    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
