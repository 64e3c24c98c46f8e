//! Webhook signature verification.
//!
//! LINE signs every webhook body with the channel secret and sends
//! `base64(HMAC-SHA256(channel_secret, body))` in the `X-Line-Signature`
//! header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use chatrelay_types::error::TransportError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Verify a base64 HMAC-SHA256 signature against the raw request body.
///
/// Uses constant-time comparison (via the hmac crate's `verify_slice`).
pub fn verify_signature(
    channel_secret: &[u8],
    body: &[u8],
    signature_b64: &str,
) -> Result<(), TransportError> {
    let signature = signature_b64.trim();
    if signature.is_empty() {
        return Err(TransportError::MissingSignature);
    }

    let expected = STANDARD
        .decode(signature)
        .map_err(|_| TransportError::SignatureMismatch)?;

    let mut mac =
        HmacSha256::new_from_slice(channel_secret).map_err(|_| TransportError::SignatureMismatch)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| TransportError::SignatureMismatch)
}

/// Compute the signature LINE would send for `body`.
pub fn compute_signature(channel_secret: &[u8], body: &[u8]) -> Result<String, TransportError> {
    let mut mac =
        HmacSha256::new_from_slice(channel_secret).map_err(|_| TransportError::SignatureMismatch)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
