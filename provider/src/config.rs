//! # Protocol Configuration & Constants
//!
//! Every magic number the provider puts on the wire lives here. Method names,
//! error codes, and JOSE identifiers are part of the compatibility surface
//! with existing DID clients; changing one breaks every caller.

use std::time::Duration;

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

/// JSON-RPC protocol literal. Mirrored verbatim into every response.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Wire name of the JWS signing method.
pub const METHOD_CREATE_JWS: &str = "did_createJWS";

/// Wire name of the JWE decryption method.
pub const METHOD_DECRYPT_JWE: &str = "did_decryptJWE";

/// Wire name of the authentication method.
pub const METHOD_AUTHENTICATE: &str = "did_authenticate";

/// Standard JSON-RPC 2.0 error codes.
pub const ERROR_PARSE: i32 = -32700;
pub const ERROR_INVALID_REQUEST: i32 = -32600;
pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;
pub const ERROR_INVALID_PARAMS: i32 = -32602;
pub const ERROR_INTERNAL: i32 = -32603;

/// Application error code for any JWE that could not be opened.
pub const ERROR_DECRYPT_FAILED: i32 = -32000;

/// Fixed message for [`ERROR_DECRYPT_FAILED`]. Never varies with the cause.
pub const DECRYPT_FAILED_MESSAGE: &str = "Failed to decrypt";

// ---------------------------------------------------------------------------
// Key Material
// ---------------------------------------------------------------------------

/// Seed length in bytes. The seed is the Ed25519 secret key.
pub const SEED_LENGTH: usize = 32;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// X25519 key length in bytes (both halves).
pub const X25519_KEY_LENGTH: usize = 32;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// DID Encoding
// ---------------------------------------------------------------------------

/// Prefix for every DID this provider emits.
pub const DID_KEY_PREFIX: &str = "did:key:";

/// Multicodec varint for `ed25519-pub` (0xed), as its two-byte encoding.
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Multibase identifier for base58btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

// ---------------------------------------------------------------------------
// JOSE
// ---------------------------------------------------------------------------

/// JWS algorithm for Ed25519 signatures (RFC 8037).
pub const JWS_ALG_EDDSA: &str = "EdDSA";

/// Legacy algorithm name still emitted by older `did-jwt` signers.
/// Accepted on verification only.
pub const JWS_ALG_ED25519_LEGACY: &str = "Ed25519";

/// Key management algorithm: X25519 ECDH-ES with XChaCha20-Poly1305 key wrap.
pub const JWE_ALG_ECDH_ES_XC20PKW: &str = "ECDH-ES+XC20PKW";

/// Content encryption algorithm: XChaCha20-Poly1305.
pub const JWE_ENC_XC20P: &str = "XC20P";

/// JWK key type and curve of the ephemeral public key.
pub const JWK_KTY_OKP: &str = "OKP";
pub const JWK_CRV_X25519: &str = "X25519";

/// XChaCha20-Poly1305 key length in bytes.
pub const XC20P_KEY_LENGTH: usize = 32;

/// XChaCha20-Poly1305 nonce length. Long enough to pick at random.
pub const XC20P_NONCE_LENGTH: usize = 24;

/// Poly1305 tag length in bytes.
pub const XC20P_TAG_LENGTH: usize = 16;

/// Concat KDF output length in bits. Only one SHA-256 round is ever needed.
pub const CONCAT_KDF_KEY_BITS: u32 = 256;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Lifetime of a `did_authenticate` response.
pub const AUTH_RESPONSE_TTL: Duration = Duration::from_secs(600);
