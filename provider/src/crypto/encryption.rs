//! # XChaCha20-Poly1305 + Concat KDF
//!
//! The symmetric half of JWE handling. Two layers use the same AEAD:
//!
//! 1. **Key wrapping**: an X25519 shared secret goes through Concat KDF
//!    (NIST SP 800-56A, single SHA-256 round) to produce a key-encryption
//!    key, which seals the 32-byte content-encryption key.
//! 2. **Content encryption**: the content-encryption key seals the
//!    cleartext, authenticating the JWE protected header as AAD.
//!
//! ## Nonce management
//!
//! XChaCha20 takes 192-bit nonces, which makes random nonces from `OsRng`
//! safe for any realistic message count per key. Every CEK is fresh anyway.
//!
//! ## Wire format
//!
//! JWE carries ciphertext and tag in separate fields, so [`seal`] returns
//! them split and [`open`] accepts them split. The tag is always 16 bytes.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{CONCAT_KDF_KEY_BITS, XC20P_KEY_LENGTH, XC20P_NONCE_LENGTH, XC20P_TAG_LENGTH};

/// Errors from the AEAD layer.
///
/// "Wrong key" and "tampered ciphertext" are the same error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("invalid nonce length: expected {XC20P_NONCE_LENGTH} bytes")]
    InvalidNonceLength,

    #[error("invalid tag length: expected {XC20P_TAG_LENGTH} bytes")]
    InvalidTagLength,
}

/// Output of [`seal`]: ciphertext and its detached authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; XC20P_TAG_LENGTH],
}

/// Derive a 256-bit key from a Diffie-Hellman output.
///
/// ```text
/// SHA-256( 1u32be || Z || len(alg)u32be || alg || 0u32be || 0u32be || 256u32be )
/// ```
///
/// `apu` and `apv` are always empty, encoded as zero lengths.
pub fn concat_kdf(shared_secret: &[u8], alg: &str) -> [u8; XC20P_KEY_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(1u32.to_be_bytes());
    hasher.update(shared_secret);
    hasher.update((alg.len() as u32).to_be_bytes());
    hasher.update(alg.as_bytes());
    hasher.update(0u32.to_be_bytes());
    hasher.update(0u32.to_be_bytes());
    hasher.update(CONCAT_KDF_KEY_BITS.to_be_bytes());
    hasher.finalize().into()
}

/// Fresh random 256-bit key.
pub fn random_key() -> [u8; XC20P_KEY_LENGTH] {
    let mut key = [0u8; XC20P_KEY_LENGTH];
    OsRng.fill_bytes(&mut key);
    key
}

/// Fresh random 192-bit nonce.
pub fn random_nonce() -> [u8; XC20P_NONCE_LENGTH] {
    let mut nonce = [0u8; XC20P_NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key`/`nonce`, authenticating `aad`.
pub fn seal(
    key: &[u8; XC20P_KEY_LENGTH],
    nonce: &[u8; XC20P_NONCE_LENGTH],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Sealed, EncryptionError> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let mut ciphertext = cipher
        .encrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let tag_start = ciphertext
        .len()
        .checked_sub(XC20P_TAG_LENGTH)
        .ok_or(EncryptionError::EncryptFailed)?;
    let tag: [u8; XC20P_TAG_LENGTH] = ciphertext[tag_start..]
        .try_into()
        .map_err(|_| EncryptionError::EncryptFailed)?;
    ciphertext.truncate(tag_start);

    Ok(Sealed { ciphertext, tag })
}

/// Decrypt a detached ciphertext/tag pair.
///
/// Nonce and tag arrive straight off the wire, so their lengths are checked
/// here rather than trusted.
pub fn open(
    key: &[u8; XC20P_KEY_LENGTH],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if nonce.len() != XC20P_NONCE_LENGTH {
        return Err(EncryptionError::InvalidNonceLength);
    }
    if tag.len() != XC20P_TAG_LENGTH {
        return Err(EncryptionError::InvalidTagLength);
    }

    let mut sealed = Vec::with_capacity(ciphertext.len() + XC20P_TAG_LENGTH);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: &sealed,
                aad,
            },
        )
        .map_err(|_| EncryptionError::DecryptFailed)
}
