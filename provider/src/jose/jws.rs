//! # JSON Web Signatures
//!
//! Ed25519 JWS in compact (`header.payload.signature`) and general JSON
//! serialization (RFC 7515 §7.2.1).
//!
//! Headers and payloads are serialized with sorted object keys, so signing
//! the same payload with the same key and header always produces the same
//! JWS, byte for byte.
//!
//! Verification uses `ed25519-dalek`'s strict mode and accepts both `EdDSA`
//! (RFC 8037) and the legacy `Ed25519` algorithm name.

use ed25519_dalek::{Signature, VerifyingKey};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{JWS_ALG_ED25519_LEGACY, JWS_ALG_EDDSA, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::keys::SigningKeypair;
use crate::jose::encoding::{
    base64url_decode, base64url_encode, decode_json_section, encode_json_section,
};

/// Errors from JWS creation and verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwsError {
    #[error("failed to serialize JWS section: {0}")]
    Serialization(String),

    #[error("malformed JWS: {0}")]
    Malformed(&'static str),

    #[error("unsupported JWS algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    VerificationFailed,
}

impl From<serde_json::Error> for JwsError {
    fn from(e: serde_json::Error) -> Self {
        JwsError::Serialization(e.to_string())
    }
}

/// Sign `payload` as a compact JWS.
///
/// `protected` carries the caller's header fields; `alg` is always forced to
/// `EdDSA`, overriding whatever the caller put there.
pub fn create_jws(
    keypair: &SigningKeypair,
    payload: &Value,
    mut protected: Map<String, Value>,
) -> Result<String, JwsError> {
    protected.insert("alg".into(), Value::String(JWS_ALG_EDDSA.into()));

    let signing_input = format!(
        "{}.{}",
        encode_json_section(&protected)?,
        encode_json_section(payload)?
    );
    let signature = keypair.sign(signing_input.as_bytes());

    Ok(format!("{}.{}", signing_input, base64url_encode(signature)))
}

/// A JWS whose signature checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedJws {
    /// Decoded protected header.
    pub header: Map<String, Value>,
    /// Raw payload bytes. Not necessarily JSON.
    pub payload: Vec<u8>,
}

impl VerifiedJws {
    /// Parse the payload as JSON.
    pub fn payload_json<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(&self.payload).ok()
    }
}

/// Verify a compact JWS against an Ed25519 public key.
pub fn verify_jws(
    jws: &str,
    public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> Result<VerifiedJws, JwsError> {
    let mut sections = jws.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
        sections.next(),
        sections.next(),
        sections.next(),
        sections.next(),
    ) else {
        return Err(JwsError::Malformed("expected three dot-separated sections"));
    };

    let header: Map<String, Value> =
        decode_json_section(header_b64).ok_or(JwsError::Malformed("header is not JSON"))?;
    match header.get("alg").and_then(Value::as_str) {
        Some(JWS_ALG_EDDSA) | Some(JWS_ALG_ED25519_LEGACY) => {}
        Some(other) => return Err(JwsError::UnsupportedAlgorithm(other.to_string())),
        None => return Err(JwsError::Malformed("header has no alg")),
    }

    let payload =
        base64url_decode(payload_b64).map_err(|_| JwsError::Malformed("payload is not base64url"))?;
    let signature_bytes: [u8; SIGNATURE_LENGTH] = base64url_decode(signature_b64)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(JwsError::Malformed("signature is not 64 base64url bytes"))?;

    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| JwsError::InvalidPublicKey)?;
    let signing_input = &jws[..header_b64.len() + 1 + payload_b64.len()];
    verifying_key
        .verify_strict(
            signing_input.as_bytes(),
            &Signature::from_bytes(&signature_bytes),
        )
        .map_err(|_| JwsError::VerificationFailed)?;

    Ok(VerifiedJws { header, payload })
}

// ---------------------------------------------------------------------------
// General JSON serialization
// ---------------------------------------------------------------------------

/// One entry of a general JWS `signatures` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsSignature {
    /// base64url protected header.
    pub protected: String,
    /// base64url signature.
    pub signature: String,
}

/// General JWS JSON serialization: one payload, any number of signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralJws {
    /// base64url payload.
    pub payload: String,
    pub signatures: Vec<JwsSignature>,
}

impl GeneralJws {
    /// Lift a compact JWS into the general serialization.
    pub fn from_compact(jws: &str) -> Result<Self, JwsError> {
        let mut sections = jws.split('.');
        match (
            sections.next(),
            sections.next(),
            sections.next(),
            sections.next(),
        ) {
            (Some(protected), Some(payload), Some(signature), None) => Ok(Self {
                payload: payload.to_string(),
                signatures: vec![JwsSignature {
                    protected: protected.to_string(),
                    signature: signature.to_string(),
                }],
            }),
            _ => Err(JwsError::Malformed("expected three dot-separated sections")),
        }
    }

    /// Compact form of the signature at `index`.
    pub fn to_compact(&self, index: usize) -> Option<String> {
        self.signatures
            .get(index)
            .map(|sig| format!("{}.{}.{}", sig.protected, self.payload, sig.signature))
    }
}
