//! The stored message record.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single encrypted message record, owned exclusively by the store.
///
/// Immutable once created; leaves the store only by explicit clear or by
/// eviction once its expiry has elapsed. Plaintext never appears here.
#[derive(Debug, Clone)]
pub struct Message {
    /// Opaque unique id.
    pub id: Uuid,
    /// The user identifier this record belongs to. Acts as the partition key
    /// and selects the key used for decryption; never changes.
    pub owner_id: String,
    /// The encrypted content: `base64(IV || ciphertext)`.
    pub encrypted_content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time, strictly greater than `created_at` when present.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Returns `true` once `now` has passed this record's expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> Message {
        Message {
            id: Uuid::new_v4(),
            owner_id: "alice".into(),
            encrypted_content: String::new(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn no_expiry_never_expires() {
        let msg = record(None);
        assert!(!msg.is_expired(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn expires_once_deadline_passes() {
        let now = Utc::now();
        let msg = record(Some(now + Duration::minutes(5)));
        assert!(!msg.is_expired(now));
        assert!(msg.is_expired(now + Duration::minutes(5)));
        assert!(msg.is_expired(now + Duration::minutes(6)));
    }
}
