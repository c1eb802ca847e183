//! Request authentication for the admin surface.
//!
//! Mutating endpoints (batch backup, prune, delete) carry an HMAC-SHA256
//! signature keyed with `APP_SECRET_KEY` over the request subject, plus a unix
//! timestamp that must be recent. Read endpoints use a plain admin key.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Separator of signed subject parts; identifier validation rejects it
pub const SUBJECT_SEPARATOR: &str = "\0";

/// Canonical signed subject of a batch request
///
/// The schema as sent (empty when omitted), then each table name, joined by
/// NUL. `None` when any part contains NUL, since the split would be ambiguous.
pub fn batch_subject<S: AsRef<str>>(schema: Option<&str>, tables: &[S]) -> Option<String> {
    let parts: Vec<&str> = std::iter::once(schema.unwrap_or(""))
        .chain(tables.iter().map(AsRef::as_ref))
        .collect();

    if parts.iter().any(|p| p.contains(SUBJECT_SEPARATOR)) {
        return None;
    }

    Some(parts.join(SUBJECT_SEPARATOR))
}

/// Check a hex HMAC-SHA256 `signature` of `subject` under `secret`
///
/// Malformed hex counts as a mismatch. The final comparison is constant-time.
pub fn signature_valid(subject: &str, signature: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        tracing::warn!("Signature is not valid hex");
        return false;
    };

    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(subject.as_bytes());
            mac.verify_slice(&expected).is_ok()
        }
        Err(e) => {
            tracing::error!("Cannot key HMAC: {}", e);
            false
        }
    }
}

/// Whether `timestamp` lies within `window_secs` of `now`, either direction
pub fn timestamp_within(timestamp: i64, now: i64, window_secs: i64) -> bool {
    let skew = now.saturating_sub(timestamp).saturating_abs();
    if skew > window_secs {
        tracing::warn!("Request timestamp off by {}s (window {}s)", skew, window_secs);
        return false;
    }
    true
}

/// Compare an admin key against the configured one without early exit
///
/// Both sides are hashed first so the comparison length does not depend on
/// the supplied key.
pub fn admin_key_matches(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
