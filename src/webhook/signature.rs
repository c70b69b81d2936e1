use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Signature header sent with a webhook delivery.
#[derive(Debug, Clone, Copy)]
pub enum SignatureHeader<'a> {
    /// `X-Hub-Signature-256: sha256=<hex>`
    Sha256(&'a str),
    /// Legacy `X-Hub-Signature: sha1=<hex>`
    Sha1(&'a str),
}

/// Verify a GitHub webhook HMAC signature against the shared secret.
pub fn verify_signature(secret: &str, payload: &[u8], header: SignatureHeader<'_>) -> Result<()> {
    let verified = match header {
        SignatureHeader::Sha256(value) => {
            let expected = decode_hex(value, "sha256=")?;
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                .map_err(|e| AppError::WebhookVerification(format!("Invalid HMAC key: {e}")))?;
            mac.update(payload);
            mac.verify_slice(&expected)
        }
        SignatureHeader::Sha1(value) => {
            let expected = decode_hex(value, "sha1=")?;
            let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
                .map_err(|e| AppError::WebhookVerification(format!("Invalid HMAC key: {e}")))?;
            mac.update(payload);
            mac.verify_slice(&expected)
        }
    };

    verified.map_err(|_| AppError::WebhookVerification("Signature mismatch".to_string()))
}

fn decode_hex(value: &str, prefix: &str) -> Result<Vec<u8>> {
    let hex_part = value
        .strip_prefix(prefix)
        .ok_or_else(|| AppError::WebhookVerification(format!("Missing {prefix} prefix")))?;

    hex::decode(hex_part)
        .map_err(|e| AppError::WebhookVerification(format!("Invalid hex in signature: {e}")))
}

#[cfg(test)]
pub(crate) fn sign_sha256(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
