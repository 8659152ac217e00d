//! Webhook signature validation.
//!
//! The IQ server signs each delivery with HMAC-SHA1 over the raw body and
//! sends the result in `X-Nexus-Webhook-Signature` as a 5-character prefix
//! followed by the lowercase hex digest. SHA-1 is kept because it is what
//! the server sends; it is not a choice to copy for new protocols.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::config::WebhookSecret;
use crate::error::WebhookError;

type HmacSha1 = Hmac<Sha1>;

/// Number of leading bytes skipped before the hex digest.
///
/// The prefix content is not interpreted.
pub const SIGNATURE_PREFIX_LEN: usize = 5;

/// Prefix written by [`sign`].
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Verify a delivery signature against the raw payload.
///
/// Computes HMAC-SHA1 of `payload` keyed with `secret`, hex-encodes it, and
/// compares it in constant time with the raw `signature` bytes after
/// stripping [`SIGNATURE_PREFIX_LEN`] bytes. The signature need not be
/// valid UTF-8; anything that is not the expected digest is a mismatch.
///
/// # Returns
///
/// * `Ok(true)` - Signature matches
/// * `Ok(false)` - Signature does not match, or is too short to hold a digest
/// * `Err(WebhookError::MissingSignatureHeader)` - `signature` is empty
///
/// # Examples
///
/// ```rust
/// use nexus_webhook::config::WebhookSecret;
/// use nexus_webhook::webhook::validation::{sign, verify};
///
/// let secret = WebhookSecret::new("s3cret");
/// let payload = br#"{"id":"1"}"#;
/// let signature = sign(&secret, payload);
///
/// assert!(verify(&secret, payload, &signature).unwrap());
/// assert!(!verify(&secret, b"tampered", &signature).unwrap());
/// ```
pub fn verify(
    secret: &WebhookSecret,
    payload: &[u8],
    signature: impl AsRef<[u8]>,
) -> Result<bool, WebhookError> {
    let signature = signature.as_ref();
    if signature.is_empty() {
        return Err(WebhookError::MissingSignatureHeader);
    }

    let Some(provided) = signature.get(SIGNATURE_PREFIX_LEN..) else {
        return Ok(false);
    };

    let Some(expected) = compute_hex_digest(secret, payload) else {
        return Ok(false);
    };

    Ok(constant_time_compare(provided, expected.as_bytes()))
}

/// Produce the `X-Nexus-Webhook-Signature` value for a payload.
///
/// The result is [`SIGNATURE_PREFIX`] followed by the lowercase hex
/// HMAC-SHA1 digest, which [`verify`] accepts.
pub fn sign(secret: &WebhookSecret, payload: &[u8]) -> String {
    let digest = compute_hex_digest(secret, payload).unwrap_or_default();
    format!("{}{}", SIGNATURE_PREFIX, digest)
}

/// Lowercase hex HMAC-SHA1 of `payload`.
///
/// `None` only if the key is rejected, which HMAC never does in practice.
fn compute_hex_digest(secret: &WebhookSecret, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha1::new_from_slice(secret.expose()).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of two byte strings.
///
/// The length check is not constant time; it reveals only the length.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
