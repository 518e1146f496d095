//! `whisper-vault` — secure vault messaging core.
//!
//! A caller posts plaintext under a user identifier; the core derives the
//! user's symmetric key, encrypts the message, and keeps only the ciphertext
//! in an ephemeral in-memory store. Reads decrypt on the way out; messages
//! can auto-expire after a per-message ttl.
//!
//! Layers, leaf first:
//! 1. [`crypto::kdf`] maps a user identifier to a fixed-length key.
//! 2. [`crypto::cipher`] runs AES-256-CBC encrypt/decrypt with IV framing.
//! 3. [`store`] holds per-user partitioned, ttl-bounded message records.
//! 4. [`service`] exposes the operations external callers invoke.
//!
//! The presentation layer (forms, tabs, toasts) is an external collaborator:
//! it calls [`VaultService`] and renders the `common` protocol shapes. This
//! crate has no network, persistence, or UI surface of its own.

pub mod config;
pub mod crypto;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use service::VaultService;
pub use store::MessageStore;
