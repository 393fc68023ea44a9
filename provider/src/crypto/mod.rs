//! # Cryptographic Primitives
//!
//! Everything the provider does with key material flows through here:
//!
//! - **Ed25519** for signatures, keyed directly by the seed.
//! - **X25519** for key agreement on the same curve. The
//!   X25519 keys are converted from the Ed25519 ones, never generated.
//! - **XChaCha20-Poly1305** for key wrapping and content encryption.
//! - **SHA-256** Concat KDF between the two.
//!
//! All of it is a thin, type-safe wrapper around the dalek and RustCrypto
//! implementations. Nothing here is hand-rolled.

pub mod encryption;
pub mod keys;

pub use encryption::{concat_kdf, open, seal, EncryptionError, Sealed};
pub use keys::{
    derive_encryption_keypair, derive_signing_keypair, edwards_to_montgomery, EncryptionKeypair,
    KeyError, KeyMaterial, Seed, SigningKeypair,
};
