//! [`MessageStore`]: ephemeral, per-user partitioned store of encrypted messages.
//!
//! # Lifecycle
//!
//! 1. A write derives the owner's key, encrypts the plaintext, and appends an
//!    immutable [`Message`] record under the write lock.
//! 2. If a ttl was given, a fire-and-forget Tokio task sleeps until the
//!    expiry and then evicts the record. Eviction is idempotent, so a timer
//!    firing after an explicit clear is a no-op.
//! 3. Reads filter by owner *and* expiry before decrypting, so an elapsed
//!    record is invisible to callers even before its timer has fired.
//!
//! Records move `Active` → `Expired-but-not-yet-evicted` (transparent to
//! readers) → `Removed`; there is no way back from `Removed`.
//!
//! # Isolation
//!
//! Each record is encrypted under the key derived from its own `owner_id`,
//! and reads only ever decrypt records selected by that same owner; the key
//! for another user's records is never derivable from the caller's
//! identifier.

pub mod message;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use common::protocol::{DecryptedMessage, MessageReceipt};

use crate::crypto::{cipher, derive_key, CipherError, EncryptedBlob};
use message::Message;

/// Content substituted for a single record whose decryption fails.
///
/// One corrupt or incompatible record must never block retrieval of its
/// sibling records.
pub const DECRYPT_FAILED_SENTINEL: &str = "[Decryption failed]";

/// Errors produced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Encrypting the message content failed in the cipher layer.
    #[error("failed to encrypt message content: {0}")]
    Encrypt(#[from] CipherError),

    /// The requested ttl was zero or negative; `expires_at` must be strictly
    /// greater than `created_at`.
    #[error("ttl must be strictly positive")]
    InvalidTtl,
}

/// Thread-safe, append-only-in-spirit store of encrypted message records.
///
/// Wraps an `Arc<RwLock<Vec<Message>>>` so that:
/// - Concurrent readers scan the collection without blocking each other.
/// - Writers (appends, clears, evictions) serialise on the write lock, so
///   concurrent appends can never corrupt the collection.
///
/// Cloning the store clones the handle, not the records; eviction timers
/// hold such a clone.
#[derive(Clone, Debug)]
pub struct MessageStore {
    inner: Arc<RwLock<Vec<Message>>>,
}

impl MessageStore {
    /// Create a new, empty [`MessageStore`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Encrypt `plaintext` under `owner_id`'s key and append a new record.
    ///
    /// Returns a receipt carrying the record's id and creation time, never
    /// the plaintext. When `ttl` is given, a one-shot eviction task is
    /// scheduled for the expiry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTtl`] if `ttl` is zero or negative, and
    /// [`StoreError::Encrypt`] if the cipher layer fails.
    pub async fn write(
        &self,
        owner_id: &str,
        plaintext: &str,
        ttl: Option<Duration>,
    ) -> Result<MessageReceipt, StoreError> {
        let created_at = Utc::now();
        let expires_at = match ttl {
            Some(ttl) if ttl <= Duration::zero() => return Err(StoreError::InvalidTtl),
            Some(ttl) => Some(created_at + ttl),
            None => None,
        };

        let key = derive_key(owner_id);
        let blob = cipher::encrypt(key.as_ref(), plaintext.as_bytes())?;

        let message = Message {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_owned(),
            encrypted_content: blob.to_base64(),
            created_at,
            expires_at,
        };
        let receipt = MessageReceipt {
            message_id: message.id,
            timestamp: message.created_at,
        };

        self.inner.write().await.push(message);
        debug!(message_id = %receipt.message_id, has_ttl = ttl.is_some(), "message stored");

        if let Some(at) = expires_at {
            self.schedule_eviction(receipt.message_id, at);
        }
        Ok(receipt)
    }

    /// Return `owner_id`'s live messages, decrypted, newest first.
    ///
    /// Expired records are excluded even if their eviction timer has not yet
    /// fired. A record that fails to decrypt yields the
    /// [`DECRYPT_FAILED_SENTINEL`] content instead of failing the batch.
    /// Ordering among equal creation times is stable within a call.
    pub async fn read_all(&self, owner_id: &str) -> Vec<DecryptedMessage> {
        let now = Utc::now();

        // Clone the candidate blobs out of the lock; decryption runs outside
        // the critical section.
        let candidates: Vec<(Uuid, String, DateTime<Utc>)> = {
            let messages = self.inner.read().await;
            messages
                .iter()
                .filter(|m| m.owner_id == owner_id && !m.is_expired(now))
                .map(|m| (m.id, m.encrypted_content.clone(), m.created_at))
                .collect()
        };

        let key = derive_key(owner_id);
        let mut decrypted: Vec<DecryptedMessage> = candidates
            .into_iter()
            .map(|(id, blob, timestamp)| {
                let content = EncryptedBlob::from_base64(&blob)
                    .and_then(|b| cipher::decrypt(key.as_ref(), &b))
                    .unwrap_or_else(|e| {
                        warn!(message_id = %id, error = %e, "stored message failed to decrypt");
                        DECRYPT_FAILED_SENTINEL.to_owned()
                    });
                DecryptedMessage {
                    id,
                    content,
                    timestamp,
                }
            })
            .collect();

        // Newest first; Vec::sort_by is stable, so equal timestamps keep
        // their insertion order.
        decrypted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        decrypted
    }

    /// Remove every record belonging to `owner_id`, returning the count.
    pub async fn clear(&self, owner_id: &str) -> usize {
        let mut messages = self.inner.write().await;
        let before = messages.len();
        messages.retain(|m| m.owner_id != owner_id);
        let removed = before - messages.len();
        debug!(removed, "cleared messages for owner");
        removed
    }

    /// Remove the record with `id`, if it still exists.
    ///
    /// Idempotent: removing an already-removed id is a no-op, so a late
    /// eviction timer can never misfire.
    pub async fn evict(&self, id: Uuid) {
        let mut messages = self.inner.write().await;
        let before = messages.len();
        messages.retain(|m| m.id != id);
        if messages.len() < before {
            debug!(message_id = %id, "evicted expired message");
        }
    }

    /// Number of records physically present, including expired-but-not-yet-
    /// evicted ones.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` if no records are physically present.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Spawn the fire-and-forget one-shot eviction task for a record.
    fn schedule_eviction(&self, id: Uuid, expires_at: DateTime<Utc>) {
        let store = self.clone();
        tokio::spawn(async move {
            let delay = (expires_at - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(delay).await;
            store.evict(id).await;
        });
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = MessageStore::new();
        let receipt = store.write("alice", "hello vault", None).await.unwrap();
        let messages = store.read_all("alice").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, receipt.message_id);
        assert_eq!(messages[0].content, "hello vault");
        assert_eq!(messages[0].timestamp, receipt.timestamp);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = MessageStore::new();
        store.write("alice", "for alice", None).await.unwrap();
        store.write("bob", "for bob", None).await.unwrap();

        let alice = store.read_all("alice").await;
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].content, "for alice");

        let bob = store.read_all("bob").await;
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].content, "for bob");
    }

    #[tokio::test]
    async fn read_returns_newest_first() {
        let store = MessageStore::new();
        for text in ["first", "second", "third"] {
            store.write("alice", text, None).await.unwrap();
            // Distinct created_at values for a deterministic order.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let contents: Vec<_> = store
            .read_all("alice")
            .await
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn expired_record_is_excluded_before_eviction_runs() {
        let store = MessageStore::new();
        store.write("alice", "still fresh", None).await.unwrap();

        // Plant an already-expired record directly, with no eviction timer.
        let key = derive_key("alice");
        let blob = cipher::encrypt(key.as_ref(), b"long gone").unwrap();
        store.inner.write().await.push(Message {
            id: Uuid::new_v4(),
            owner_id: "alice".into(),
            encrypted_content: blob.to_base64(),
            created_at: Utc::now() - Duration::minutes(10),
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        });

        let messages = store.read_all("alice").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "still fresh");
        // Still physically present: exclusion is passive, not eviction.
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn eviction_timer_removes_the_record() {
        let store = MessageStore::new();
        store
            .write("alice", "short lived", Some(Duration::milliseconds(20)))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert!(store.read_all("alice").await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn non_positive_ttl_is_rejected() {
        let store = MessageStore::new();
        let err = store
            .write("alice", "x", Some(Duration::zero()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTtl));
    }

    #[tokio::test]
    async fn clear_removes_only_the_owner_and_reports_count() {
        let store = MessageStore::new();
        store.write("alice", "one", None).await.unwrap();
        store.write("alice", "two", None).await.unwrap();
        store.write("bob", "keep me", None).await.unwrap();

        assert_eq!(store.clear("alice").await, 2);
        assert!(store.read_all("alice").await.is_empty());
        assert_eq!(store.read_all("bob").await.len(), 1);

        // Clearing again removes nothing.
        assert_eq!(store.clear("alice").await, 0);
    }

    #[tokio::test]
    async fn corrupt_record_yields_sentinel_without_hiding_siblings() {
        let store = MessageStore::new();
        let bad = store.write("alice", "doomed", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.write("alice", "healthy", None).await.unwrap();

        // Corrupt the first record's stored blob: decodes to fewer bytes
        // than an IV, so decryption fails deterministically.
        {
            let mut messages = store.inner.write().await;
            let record = messages
                .iter_mut()
                .find(|m| m.id == bad.message_id)
                .unwrap();
            record.encrypted_content = STANDARD.encode([0u8; 8]);
        }

        let messages = store.read_all("alice").await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "healthy");
        assert_eq!(messages[1].content, DECRYPT_FAILED_SENTINEL);
    }

    #[tokio::test]
    async fn evict_is_idempotent() {
        let store = MessageStore::new();
        let receipt = store.write("alice", "gone soon", None).await.unwrap();
        store.evict(receipt.message_id).await;
        store.evict(receipt.message_id).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_corrupt_the_collection() {
        let store = MessageStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .write("alice", &format!("message {i}"), None)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.read_all("alice").await.len(), 16);
    }
}
