//! HMAC-SHA256 verification of the `X-Hub-Signature-256` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Signs `payload` the way GitHub does: `sha256=<lowercase hex>`.
pub fn sign(payload: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Returns `true` when `signature` is the HMAC-SHA256 of `payload` under `secret`.
///
/// Only the exact form [`sign`] produces matches: a missing prefix, uppercase
/// or otherwise malformed hex, or a wrong length is rejected. The digest
/// comparison is constant-time.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &[u8]) -> bool {
    let Some(expected) = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .filter(|hex_sig| is_lowercase_hex(hex_sig))
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

fn is_lowercase_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
