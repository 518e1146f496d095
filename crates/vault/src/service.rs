//! [`VaultService`]: the operations exposed to external callers.
//!
//! Each operation validates its input, delegates to the store or the cipher
//! layer, and converts every typed failure into a [`ServiceError`] carrying a
//! human-readable message; no raw lower-layer error crosses this boundary.
//! A presentation layer renders the returned `common::protocol` shapes (or an
//! `ErrorResponse` built from the error) verbatim.

use chrono::Duration;
use tracing::{debug, info, warn};

use common::protocol::{ClearedResponse, MessageListResponse, MessageReceipt};
use common::ServiceError;

use crate::config::Config;
use crate::crypto::{cipher, derive_key, EncryptedBlob};
use crate::store::{MessageStore, StoreError};

/// Orchestrates the message store and the cipher engine for external callers.
///
/// Cheap to clone; clones share the same underlying store.
#[derive(Clone, Debug)]
pub struct VaultService {
    store: MessageStore,
    max_message_bytes: usize,
}

impl VaultService {
    /// Create a service with a fresh, empty store.
    pub fn new(config: &Config) -> Self {
        Self {
            store: MessageStore::new(),
            max_message_bytes: config.max_message_bytes,
        }
    }

    /// Encrypt and store a message for `user_id`.
    ///
    /// A `ttl_minutes` of zero (or `None`) means the message never expires.
    /// The receipt carries the stored record's id and creation time only;
    /// the plaintext is never echoed back.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a blank user id, an
    /// over-budget message, or an out-of-range ttl, and
    /// [`ServiceError::EncryptionFailure`] if the cipher layer fails.
    pub async fn post_message(
        &self,
        user_id: &str,
        text: &str,
        ttl_minutes: Option<u64>,
    ) -> Result<MessageReceipt, ServiceError> {
        validate_user_id(user_id)?;
        if text.len() > self.max_message_bytes {
            return Err(ServiceError::InvalidInput(format!(
                "message exceeds the {} byte limit",
                self.max_message_bytes
            )));
        }
        let ttl = match ttl_minutes.filter(|&minutes| minutes > 0) {
            Some(minutes) => Some(
                i64::try_from(minutes)
                    .ok()
                    .and_then(Duration::try_minutes)
                    .ok_or_else(|| {
                        ServiceError::InvalidInput("ttl_minutes is out of range".into())
                    })?,
            ),
            None => None,
        };

        let receipt = self.store.write(user_id, text, ttl).await.map_err(|e| match e {
            StoreError::InvalidTtl => {
                ServiceError::InvalidInput("ttl_minutes must be positive".into())
            }
            StoreError::Encrypt(e) => {
                warn!(error = %e, "failed to encrypt message");
                ServiceError::EncryptionFailure("failed to encrypt message".into())
            }
        })?;
        debug!(message_id = %receipt.message_id, expiring = ttl.is_some(), "message posted");
        Ok(receipt)
    }

    /// Retrieve `user_id`'s live messages, decrypted, newest first.
    ///
    /// Absence of messages is a normal empty listing, not a failure. A
    /// record that cannot be decrypted appears with sentinel content rather
    /// than hiding its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a blank user id.
    pub async fn get_messages(&self, user_id: &str) -> Result<MessageListResponse, ServiceError> {
        validate_user_id(user_id)?;
        let messages = self.store.read_all(user_id).await;
        Ok(MessageListResponse { messages })
    }

    /// Remove every message belonging to `user_id`.
    ///
    /// The removed count is reported for display purposes only.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a blank user id.
    pub async fn clear_messages(&self, user_id: &str) -> Result<ClearedResponse, ServiceError> {
        validate_user_id(user_id)?;
        let removed = self.store.clear(user_id).await;
        info!(removed, "messages cleared");
        Ok(ClearedResponse { removed })
    }

    /// Diagnostic pass-through: encrypt `text` under `user_id`'s key and
    /// return the framed base64 blob without storing anything.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a blank user id and
    /// [`ServiceError::EncryptionFailure`] if the cipher layer fails.
    pub async fn debug_encrypt(&self, user_id: &str, text: &str) -> Result<String, ServiceError> {
        validate_user_id(user_id)?;
        let key = derive_key(user_id);
        cipher::encrypt(key.as_ref(), text.as_bytes())
            .map(|blob| blob.to_base64())
            .map_err(|e| ServiceError::EncryptionFailure(e.to_string()))
    }

    /// Diagnostic pass-through: decrypt a framed base64 blob under
    /// `user_id`'s key and return the plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a blank user id and
    /// [`ServiceError::DecryptionFailure`] for a malformed blob, a wrong
    /// key, corrupted ciphertext, or non-UTF-8 plaintext.
    pub async fn debug_decrypt(&self, user_id: &str, blob: &str) -> Result<String, ServiceError> {
        validate_user_id(user_id)?;
        let key = derive_key(user_id);
        EncryptedBlob::from_base64(blob)
            .and_then(|parsed| cipher::decrypt(key.as_ref(), &parsed))
            .map_err(|e| ServiceError::DecryptionFailure(e.to_string()))
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ServiceError> {
    if user_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("user id must not be empty".into()));
    }
    Ok(())
}
