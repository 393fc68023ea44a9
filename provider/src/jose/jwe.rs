//! # JSON Web Encryption
//!
//! JWE in general JSON serialization, with X25519 recipients:
//!
//! - `alg`: `ECDH-ES+XC20PKW`: an ephemeral X25519 key per recipient,
//!   Concat KDF to a key-encryption key, XChaCha20-Poly1305 to wrap the CEK.
//! - `enc`: `XC20P`: XChaCha20-Poly1305 over the cleartext, with the
//!   protected header (plus `.aad` when present) as additional data.
//!
//! This is the envelope `did-jwt` produces with `x25519Encrypter`, so JWEs
//! built by JavaScript DID clients decrypt here and vice versa.
//!
//! ```text
//! {
//!   "protected": b64u({"enc":"XC20P", ...}),
//!   "iv": b64u(24 bytes), "ciphertext": b64u(..), "tag": b64u(16 bytes),
//!   "aad": b64u(..)?,
//!   "recipients": [{
//!     "encrypted_key": b64u(32 bytes),
//!     "header": { "alg": "ECDH-ES+XC20PKW", "iv": .., "tag": ..,
//!                 "epk": { "kty": "OKP", "crv": "X25519", "x": .. }, "kid": ..? }
//!   }]
//! }
//! ```

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey};
use zeroize::Zeroizing;

use crate::config::{
    JWE_ALG_ECDH_ES_XC20PKW, JWE_ENC_XC20P, JWK_CRV_X25519, JWK_KTY_OKP, X25519_KEY_LENGTH,
    XC20P_KEY_LENGTH,
};
use crate::crypto::encryption::{concat_kdf, open, random_key, random_nonce, seal, EncryptionError};
use crate::crypto::keys::{edwards_to_montgomery, EncryptionKeypair};
use crate::identity::did::{decode_did, key_id};
use crate::jose::encoding::{base64url_decode, base64url_encode, decode_json_section, encode_json_section};

/// Errors from JWE handling.
///
/// Decryption failures carry no detail about *which* check failed; the
/// variants only say which stage gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JweError {
    #[error("malformed JWE: {0}")]
    Malformed(&'static str),

    #[error("unsupported content encryption: {0}")]
    UnsupportedEncryption(String),

    #[error("JWE has no recipients")]
    NoRecipients,

    #[error("no recipient could be decrypted with this key")]
    DecryptionFailed,

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("failed to serialize JWE header: {0}")]
    Serialization(String),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A JWE in general JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwe {
    /// base64url protected header.
    pub protected: String,
    pub iv: String,
    pub ciphertext: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<JweRecipient>,
}

/// Per-recipient wrapped content key.
///
/// The header stays untyped: entries for other key management algorithms
/// carry fields this crate does not model, and they must not stop the
/// envelope from parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JweRecipient {
    pub encrypted_key: String,
    #[serde(default)]
    pub header: Map<String, Value>,
}

/// Key agreement parameters of one `ECDH-ES+XC20PKW` recipient, resolved
/// from its header with the protected header laid over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientHeader {
    /// Key management algorithm.
    pub alg: String,
    /// Nonce used to wrap the CEK.
    pub iv: String,
    /// Tag of the wrapped CEK.
    pub tag: String,
    pub epk: EphemeralPublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl RecipientHeader {
    /// Overlay `protected` on `header` and read the result. `None` when a
    /// field is missing or has the wrong shape.
    pub fn resolve(header: &Map<String, Value>, protected: &Map<String, Value>) -> Option<Self> {
        let mut merged = header.clone();
        merged.extend(protected.iter().map(|(k, v)| (k.clone(), v.clone())));
        serde_json::from_value(Value::Object(merged)).ok()
    }

    fn into_map(self) -> Result<Map<String, Value>, JweError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(JweError::Serialization("recipient header is not an object".into())),
            Err(e) => Err(JweError::Serialization(e.to_string())),
        }
    }
}

/// Ephemeral X25519 public key as an OKP JWK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralPublicKey {
    pub kty: String,
    pub crv: String,
    pub x: String,
}

impl Jwe {
    /// Parse a JWE out of a JSON value. Any shape mismatch is `Malformed`.
    pub fn from_value(value: Value) -> Result<Self, JweError> {
        serde_json::from_value(value).map_err(|_| JweError::Malformed("not a JWE object"))
    }

    /// Decoded protected header.
    pub fn protected_header(&self) -> Result<Map<String, Value>, JweError> {
        decode_json_section(&self.protected).ok_or(JweError::Malformed("protected header"))
    }

    /// Bytes authenticated alongside the content.
    fn content_aad(&self) -> String {
        match &self.aad {
            Some(aad) => format!("{}.{}", self.protected, aad),
            None => self.protected.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decryption
// ---------------------------------------------------------------------------

/// Decrypt a JWE with the holder's X25519 keypair.
///
/// Each recipient header is read with the protected header fields laid over
/// it. Every recipient that resolves to `ECDH-ES+XC20PKW` over X25519 is
/// tried in order; the first one that unwraps a CEK which then opens the
/// content wins. Entries for other algorithms are skipped.
pub fn decrypt_jwe(jwe: &Jwe, keypair: &EncryptionKeypair) -> Result<Vec<u8>, JweError> {
    let protected = jwe.protected_header()?;
    match protected.get("enc").and_then(Value::as_str) {
        Some(JWE_ENC_XC20P) => {}
        other => {
            return Err(JweError::UnsupportedEncryption(
                other.unwrap_or("none").to_string(),
            ))
        }
    }

    let iv = base64url_decode(&jwe.iv).map_err(|_| JweError::Malformed("iv"))?;
    let ciphertext =
        base64url_decode(&jwe.ciphertext).map_err(|_| JweError::Malformed("ciphertext"))?;
    let tag = base64url_decode(&jwe.tag).map_err(|_| JweError::Malformed("tag"))?;
    let aad = jwe.content_aad();

    if jwe.recipients.is_empty() {
        return Err(JweError::NoRecipients);
    }

    for recipient in &jwe.recipients {
        let Some(header) = RecipientHeader::resolve(&recipient.header, &protected) else {
            continue;
        };
        if header.alg != JWE_ALG_ECDH_ES_XC20PKW {
            continue;
        }
        let Some(cek) = unwrap_cek(&header, &recipient.encrypted_key, keypair) else {
            continue;
        };
        if let Ok(cleartext) = open(&cek, &iv, &ciphertext, &tag, aad.as_bytes()) {
            return Ok(cleartext);
        }
    }

    Err(JweError::DecryptionFailed)
}

/// Recover the content key from one recipient entry, if it is ours.
fn unwrap_cek(
    header: &RecipientHeader,
    encrypted_key: &str,
    keypair: &EncryptionKeypair,
) -> Option<Zeroizing<[u8; XC20P_KEY_LENGTH]>> {
    if header.epk.kty != JWK_KTY_OKP || header.epk.crv != JWK_CRV_X25519 {
        return None;
    }

    let epk: [u8; X25519_KEY_LENGTH] = base64url_decode(&header.epk.x).ok()?.try_into().ok()?;
    let shared = keypair.diffie_hellman(&epk);
    // Low-order ephemeral keys give an all-zero secret anyone can compute.
    if !shared.was_contributory() {
        return None;
    }
    let kek = Zeroizing::new(concat_kdf(shared.as_bytes(), JWE_ALG_ECDH_ES_XC20PKW));

    let iv = base64url_decode(&header.iv).ok()?;
    let tag = base64url_decode(&header.tag).ok()?;
    let wrapped = base64url_decode(encrypted_key).ok()?;

    let cek = Zeroizing::new(open(&kek, &iv, &wrapped, &tag, &[]).ok()?);
    let cek: [u8; XC20P_KEY_LENGTH] = cek.as_slice().try_into().ok()?;
    Some(Zeroizing::new(cek))
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

/// An X25519 public key a JWE can be addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X25519Recipient {
    pub public_key: [u8; X25519_KEY_LENGTH],
    pub kid: Option<String>,
}

impl X25519Recipient {
    /// Recipient without a key id.
    pub fn new(public_key: [u8; X25519_KEY_LENGTH]) -> Self {
        Self {
            public_key,
            kid: None,
        }
    }

    /// Set the `kid` emitted in the recipient header.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Address an Ed25519 `did:key`: its key is converted to X25519 and its
    /// verification method id becomes the `kid`.
    pub fn from_did(did: &str) -> Result<Self, JweError> {
        let public_key = decode_did(did).map_err(|e| JweError::InvalidRecipient(e.to_string()))?;
        let public_key =
            edwards_to_montgomery(&public_key).map_err(|e| JweError::InvalidRecipient(e.to_string()))?;
        Ok(Self::new(public_key).with_kid(key_id(did)))
    }
}

/// Encrypt `cleartext` to one or more X25519 recipients.
///
/// A single random CEK encrypts the content; each recipient gets it wrapped
/// under its own ephemeral-static key agreement. Any `alg` in `protected` is
/// dropped and `enc` is set to `XC20P`.
pub fn encrypt_jwe(
    cleartext: &[u8],
    recipients: &[X25519Recipient],
    mut protected: Map<String, Value>,
    aad: Option<&[u8]>,
) -> Result<Jwe, JweError> {
    if recipients.is_empty() {
        return Err(JweError::NoRecipients);
    }

    protected.remove("alg");
    protected.insert("enc".into(), Value::String(JWE_ENC_XC20P.into()));
    let protected =
        encode_json_section(&protected).map_err(|e| JweError::Serialization(e.to_string()))?;
    let aad = aad.map(base64url_encode);
    let content_aad = match &aad {
        Some(aad) => format!("{protected}.{aad}"),
        None => protected.clone(),
    };

    let cek = Zeroizing::new(random_key());
    let iv = random_nonce();
    let sealed = seal(&cek, &iv, cleartext, content_aad.as_bytes())?;

    let recipients = recipients
        .iter()
        .map(|recipient| wrap_cek(&cek, recipient))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Jwe {
        protected,
        iv: base64url_encode(iv),
        ciphertext: base64url_encode(&sealed.ciphertext),
        tag: base64url_encode(sealed.tag),
        aad,
        recipients,
    })
}

fn wrap_cek(
    cek: &[u8; XC20P_KEY_LENGTH],
    recipient: &X25519Recipient,
) -> Result<JweRecipient, JweError> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let epk = X25519PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&X25519PublicKey::from(recipient.public_key));
    if !shared.was_contributory() {
        return Err(JweError::InvalidRecipient("low-order public key".into()));
    }
    let kek = Zeroizing::new(concat_kdf(shared.as_bytes(), JWE_ALG_ECDH_ES_XC20PKW));

    let iv = random_nonce();
    let sealed = seal(&kek, &iv, cek, &[])?;

    let header = RecipientHeader {
        alg: JWE_ALG_ECDH_ES_XC20PKW.into(),
        iv: base64url_encode(iv),
        tag: base64url_encode(sealed.tag),
        epk: EphemeralPublicKey {
            kty: JWK_KTY_OKP.into(),
            crv: JWK_CRV_X25519.into(),
            x: base64url_encode(epk.as_bytes()),
        },
        kid: recipient.kid.clone(),
    };

    Ok(JweRecipient {
        encrypted_key: base64url_encode(&sealed.ciphertext),
        header: header.into_map()?,
    })
}
