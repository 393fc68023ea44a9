//! # Identity Module
//!
//! The provider's public identity is a `did:key` DID: the Ed25519 public key
//! wrapped in multicodec and multibase, nothing more. There is no registry
//! and no document to fetch; the DID *is* the key.

pub mod did;

pub use did::{decode_did, encode_did, key_id, DidError};
