//! Base64 flavours used by JOSE and by the RPC results.
//!
//! JOSE sections are base64url without padding. Decoding tolerates padding
//! because some encoders emit it anyway. Decrypted cleartext goes back to
//! the caller as standard base64 *with* padding.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};
use serde::{de::DeserializeOwned, Serialize};

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// base64url, no padding.
pub fn base64url_encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64URL.encode(bytes)
}

/// base64url, padding optional.
pub fn base64url_decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64URL.decode(encoded)
}

/// Standard base64 with `=` padding.
pub fn base64pad_encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Serialize a value to JSON and base64url it, as a JWS/JWE section.
///
/// `serde_json` maps are ordered by key, so equal objects always produce
/// byte-identical sections.
pub fn encode_json_section<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(base64url_encode(serde_json::to_vec(value)?))
}

/// Reverse of [`encode_json_section`]. `None` on either decoding failure.
pub fn decode_json_section<T: DeserializeOwned>(section: &str) -> Option<T> {
    let bytes = base64url_decode(section).ok()?;
    serde_json::from_slice(&bytes).ok()
}
