use chrono::Utc;

use crate::config::Config;
use crate::constants::{ERR_INVALID_TIMESTAMP, MAX_TIMESTAMP_AGE_SECS};
use crate::error::AppError;
use crate::security::{admin_key_matches, signature_valid, timestamp_within};

/// Why a signed request was refused
#[derive(Debug, PartialEq, Eq)]
pub enum SignedRequestError {
    BadSignature,
    StaleTimestamp,
}

impl From<SignedRequestError> for AppError {
    fn from(err: SignedRequestError) -> Self {
        match err {
            SignedRequestError::BadSignature => AppError::InvalidSignature,
            SignedRequestError::StaleTimestamp => {
                AppError::InvalidInput(ERR_INVALID_TIMESTAMP.to_string())
            }
        }
    }
}

/// Authenticate a mutating request whose signed subject is `subject`
///
/// The signature is checked before the timestamp, so an unsigned caller
/// learns nothing about the clock window.
pub fn validate_signed_request(
    subject: &str,
    signature: &str,
    timestamp: i64,
    secret: &str,
) -> Result<(), SignedRequestError> {
    if !signature_valid(subject, signature, secret) {
        tracing::warn!("Rejected request for {:?}: bad signature", subject);
        return Err(SignedRequestError::BadSignature);
    }

    if !timestamp_within(timestamp, Utc::now().timestamp(), MAX_TIMESTAMP_AGE_SECS) {
        return Err(SignedRequestError::StaleTimestamp);
    }

    Ok(())
}

/// Check the read-endpoint key; read endpoints are off without a configured key
pub fn require_admin_key(config: &Config, provided: &str) -> Result<(), AppError> {
    let Some(expected) = config.admin_secret_key.as_deref() else {
        tracing::warn!("Admin read refused: ADMIN_SECRET_KEY is not set");
        return Err(AppError::Unauthorized);
    };

    if !admin_key_matches(provided, expected) {
        tracing::warn!("Admin read refused: wrong key");
        return Err(AppError::Unauthorized);
    }

    Ok(())
}
