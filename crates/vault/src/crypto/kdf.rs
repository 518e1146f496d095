//! Derivation of a user's symmetric key from their identifier.
//!
//! **This derivation is NOT cryptographically strong.** It is a demo
//! placeholder: each key byte is the identifier byte at `i % len` XORed with
//! a fixed mixing constant, so anyone who knows an identifier can reproduce
//! its key. A production deployment MUST swap the body of [`derive_key`] for
//! a salted password-based KDF (100k+ iteration PBKDF2, or Argon2) with a
//! per-user random salt persisted by the identity/auth collaborator (not
//! derivable from the identifier). The interface stays the same either way:
//! identifier in, fixed-length key out.

use super::cipher::KEY_LEN;

/// Mixing constant applied to every identifier byte.
const MIX_BYTE: u8 = 0x42;

/// Fixed-size key buffer holding exactly [`KEY_LEN`] bytes.
///
/// Derived on demand and owned transiently by cipher calls; never persisted.
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which key material lives in RAM.
pub struct KeyBytes(pub [u8; KEY_LEN]);

impl Drop for KeyBytes {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Derive the 256-bit symmetric key for `user_id`.
///
/// Pure and deterministic: the same identifier always yields the same key
/// within a process lifetime, and distinct identifiers yield distinct keys
/// with high probability. Total over any non-empty string.
///
/// Callers must reject empty identifiers before deriving; an empty input
/// yields the degenerate all-zero key rather than panicking.
pub fn derive_key(user_id: &str) -> KeyBytes {
    let id_bytes = user_id.as_bytes();
    let mut key = [0u8; KEY_LEN];
    if !id_bytes.is_empty() {
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = id_bytes[i % id_bytes.len()] ^ MIX_BYTE;
        }
    }
    KeyBytes(key)
}
