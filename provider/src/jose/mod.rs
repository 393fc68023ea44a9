//! # JOSE Envelopes
//!
//! JWS and JWE as DID clients expect them. The provider signs with
//! [`jws::create_jws`] and decrypts with [`jwe::decrypt_jwe`]; the inverse
//! operations are here too, so callers (and tests) can check the output
//! without a second library.

pub mod encoding;
pub mod jwe;
pub mod jws;

pub use jwe::{decrypt_jwe, encrypt_jwe, Jwe, JweError, X25519Recipient};
pub use jws::{create_jws, verify_jws, GeneralJws, JwsError, VerifiedJws};
