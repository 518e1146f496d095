//! Symmetric encryption primitives: key derivation and the AES-256-CBC engine.
//!
//! This module is intentionally free of storage and service dependencies.
//! It provides the low-level derive/encrypt/decrypt operations used by the
//! message store and the diagnostic service operations.
//!
//! # Blob format
//!
//! ```text
//! base64(IV[16] || ciphertext)
//! ```
//!
//! The IV is prepended to the ciphertext *before* base64 encoding, and must
//! be sliced off the front of the *decoded* bytes before the remainder is
//! handed to the block cipher.

pub mod cipher;
pub mod kdf;

pub use cipher::{CipherError, EncryptedBlob, IV_LEN, KEY_LEN};
pub use kdf::{derive_key, KeyBytes};
