//! Response types exchanged between the vault core and its UI collaborators.
//!
//! These are the serialisable shapes a presentation layer consumes. Each
//! operation either produces one of the success bodies below or an
//! [`ErrorResponse`]; plaintext never appears in a write-path response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Post message
// ---------------------------------------------------------------------------

/// Successful response body for a stored message.
///
/// Carries the identity of the stored record only: never the plaintext and
/// never the ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Opaque unique id of the stored message.
    pub message_id: Uuid,
    /// Creation time of the stored message.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Get messages
// ---------------------------------------------------------------------------

/// A single decrypted message as returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptedMessage {
    /// Opaque unique id of the message.
    pub id: Uuid,
    /// Decrypted plaintext content, or the fixed sentinel when the stored
    /// record could not be decrypted.
    pub content: String,
    /// Creation time of the message.
    pub timestamp: DateTime<Utc>,
}

/// Successful response body for a message listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    /// The owner's live messages, ordered by creation time descending.
    pub messages: Vec<DecryptedMessage>,
}

// ---------------------------------------------------------------------------
// Clear messages
// ---------------------------------------------------------------------------

/// Successful response body for a clear operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedResponse {
    /// Number of messages removed. For display purposes only.
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any failed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"invalid_input"`).
    pub code: String,
    /// Human-readable description safe to display to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
