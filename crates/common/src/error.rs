//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// This is the only failure shape that crosses the service boundary. Every
/// lower-layer error (cipher, store) is converted into one of these variants
/// with a human-readable message before being handed to a caller; raw
/// internal errors never escape.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller's input was rejected — blank user id, oversized message,
    /// or an out-of-range ttl.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Encrypting a message failed in the cipher layer.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// Decrypting a blob failed — malformed framing, wrong key, corrupted
    /// ciphertext, or non-UTF-8 plaintext.
    #[error("decryption failure: {0}")]
    DecryptionFailure(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the machine-readable code for this error, suitable for the
    /// `code` field of an [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::DecryptionFailure(_) => "decryption_failure",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
