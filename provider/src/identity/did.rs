//! # `did:key` Encoding
//!
//! Maps an Ed25519 public key to a `did:key` identifier and back.
//!
//! ## DID Format
//!
//! ```text
//! did:key:z<base58btc(0xed 0x01 || public_key)>
//! ```
//!
//! The two-byte prefix is the multicodec varint for `ed25519-pub`; the `z`
//! is the multibase code for base58btc. Together they make the string
//! self-describing: no context is needed to know what key it carries. Every
//! Ed25519 `did:key` therefore starts with `did:key:z6Mk`.
//!
//! ## Standards References
//!
//! - [The did:key Method](https://w3c-ccg.github.io/did-method-key/)
//! - [Multibase](https://datatracker.ietf.org/doc/html/draft-multiformats-multibase)
//! - [Multicodec table](https://github.com/multiformats/multicodec/blob/master/table.csv)

use thiserror::Error;

use crate::config::{DID_KEY_PREFIX, ED25519_MULTICODEC, MULTIBASE_BASE58BTC, PUBLIC_KEY_LENGTH};

/// Errors that can occur while parsing a `did:key`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DidError {
    /// The string does not have the `did:<method>:<id>` shape.
    #[error("invalid DID format: {0}")]
    InvalidFormat(String),

    /// The DID method is not `key`.
    #[error("unsupported DID method: expected 'key', got '{0}'")]
    UnsupportedMethod(String),

    /// The method-specific id is not base58btc multibase.
    #[error("invalid multibase identifier: {0}")]
    InvalidMultibase(String),

    /// The multicodec prefix is not `ed25519-pub`.
    #[error("unsupported key type: multicodec prefix {0:02x?}")]
    UnsupportedKeyType(Vec<u8>),

    /// The decoded key is not 32 bytes.
    #[error("invalid key length: expected {PUBLIC_KEY_LENGTH} bytes, got {0}")]
    InvalidKeyLength(usize),
}

/// Encode an Ed25519 public key as a `did:key` DID.
///
/// Pure and deterministic: the same key always yields the same DID, which
/// is what keeps a provider's identity stable across restarts from the same
/// seed.
///
/// # Examples
///
/// ```
/// use key_did_provider_ed25519::identity::encode_did;
///
/// let did = encode_did(&[0u8; 32]);
/// assert!(did.starts_with("did:key:z6Mk"));
/// ```
pub fn encode_did(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    let mut tagged = Vec::with_capacity(ED25519_MULTICODEC.len() + PUBLIC_KEY_LENGTH);
    tagged.extend_from_slice(&ED25519_MULTICODEC);
    tagged.extend_from_slice(public_key);
    format!(
        "{}{}{}",
        DID_KEY_PREFIX,
        MULTIBASE_BASE58BTC,
        bs58::encode(&tagged).into_string()
    )
}

/// Decode an Ed25519 `did:key` back into its public key.
///
/// A trailing `#fragment` (as found in verification method ids) is ignored.
pub fn decode_did(did: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], DidError> {
    let did = did.split('#').next().unwrap_or(did);
    let parts: Vec<&str> = did.splitn(3, ':').collect();
    if parts.len() != 3 || parts[0] != "did" || parts[2].is_empty() {
        return Err(DidError::InvalidFormat(
            "DID must have format 'did:<method>:<identifier>'".into(),
        ));
    }

    if parts[1] != "key" {
        return Err(DidError::UnsupportedMethod(parts[1].to_string()));
    }

    let encoded = parts[2]
        .strip_prefix(MULTIBASE_BASE58BTC)
        .ok_or_else(|| DidError::InvalidMultibase("expected base58btc ('z') prefix".into()))?;
    let tagged = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| DidError::InvalidMultibase(e.to_string()))?;

    let Some(key) = tagged.strip_prefix(&ED25519_MULTICODEC[..]) else {
        return Err(DidError::UnsupportedKeyType(
            tagged.iter().take(ED25519_MULTICODEC.len()).copied().collect(),
        ));
    };

    key.try_into()
        .map_err(|_| DidError::InvalidKeyLength(key.len()))
}

/// Verification method id for a DID, used as the JWS `kid`.
///
/// `did:key:zXYZ` becomes `did:key:zXYZ#zXYZ`. A DID that already carries a
/// fragment, or has no method-specific id, is returned unchanged.
pub fn key_id(did: &str) -> String {
    if did.contains('#') {
        return did.to_string();
    }
    match did.splitn(3, ':').nth(2) {
        Some(id) if !id.is_empty() => format!("{did}#{id}"),
        _ => did.to_string(),
    }
}
