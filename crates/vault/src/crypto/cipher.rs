//! AES-256-CBC encryption and decryption of message payloads.
//!
//! Every encryption call draws a fresh random IV from the OS CSPRNG; the IV
//! is never reused and travels with its ciphertext as the first [`IV_LEN`]
//! bytes of the framed blob. The decode path slices the IV off the front of
//! the base64-*decoded* bytes before any cipher operation runs. A blob too
//! short to contain an IV is rejected up front, and a padding or decode
//! failure surfaces as a hard error rather than empty output.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The blob is not valid base64, or its decoded form is shorter than the
    /// [`IV_LEN`]-byte IV. Rejected before any cipher operation is attempted.
    #[error("encrypted blob is malformed: {0}")]
    MalformedBlob(String),

    /// The padding or cipher integrity check failed — wrong key, corrupted
    /// ciphertext, or wrong IV.
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    DecryptionFailure,

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted bytes are not valid UTF-8")]
    EncodingFailure,

    /// The underlying primitive could not be initialised (wrong key length).
    #[error("cipher primitive unavailable: {0}")]
    CryptoFailure(String),
}

/// A parsed encrypted blob: the IV and the ciphertext it was produced with.
///
/// The wire/storage representation is `base64(IV || ciphertext)` as a single
/// string; this is the only persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    /// Raw IV bytes for this specific encryption.
    pub iv: [u8; IV_LEN],
    /// Raw CBC cipher output (PKCS#7 padded).
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Encode this blob to its canonical base64 string representation.
    pub fn to_base64(&self) -> String {
        let mut framed = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        framed.extend_from_slice(&self.iv);
        framed.extend_from_slice(&self.ciphertext);
        STANDARD.encode(framed)
    }

    /// Parse a base64 blob string back into an [`EncryptedBlob`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedBlob`] if `s` is not valid base64 or
    /// decodes to fewer than [`IV_LEN`] bytes.
    pub fn from_base64(s: &str) -> Result<Self, CipherError> {
        let decoded = STANDARD
            .decode(s)
            .map_err(|e| CipherError::MalformedBlob(format!("invalid base64: {e}")))?;
        if decoded.len() < IV_LEN {
            return Err(CipherError::MalformedBlob(format!(
                "decoded length {} is shorter than the {IV_LEN}-byte IV",
                decoded.len()
            )));
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&decoded[..IV_LEN]);
        Ok(Self {
            iv,
            ciphertext: decoded[IV_LEN..].to_vec(),
        })
    }
}

/// Encrypt `plaintext` under `key` with AES-256-CBC and a fresh random IV.
///
/// # Errors
///
/// Returns [`CipherError::CryptoFailure`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<EncryptedBlob, CipherError> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let encryptor = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|e| CipherError::CryptoFailure(e.to_string()))?;
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(EncryptedBlob { iv, ciphertext })
}

/// Decrypt an [`EncryptedBlob`] under `key` using the IV embedded in the blob.
///
/// # Errors
///
/// Returns [`CipherError::CryptoFailure`] if `key` is not [`KEY_LEN`] bytes,
/// [`CipherError::DecryptionFailure`] if the padding check fails (wrong key
/// or tampered data), and [`CipherError::EncodingFailure`] if the decrypted
/// bytes are not valid UTF-8.
pub fn decrypt(key: &[u8], blob: &EncryptedBlob) -> Result<String, CipherError> {
    let decryptor = Aes256CbcDec::new_from_slices(key, &blob.iv)
        .map_err(|e| CipherError::CryptoFailure(e.to_string()))?;
    let plaintext = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&blob.ciphertext)
        .map_err(|_| CipherError::DecryptionFailure)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::EncodingFailure)
}
