// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # key-did-provider-ed25519
//!
//! A `did:key` provider for Ed25519 seeds. Give it 32 bytes and it becomes a
//! DID: it signs JWS, decrypts JWE, and answers authentication challenges
//! through a JSON-RPC 2.0 `send` call, the same interface browser DID
//! clients talk to.
//!
//! ```no_run
//! use key_did_provider_ed25519::{DidProvider, Ed25519Provider, RpcRequest};
//! use serde_json::json;
//!
//! let provider = Ed25519Provider::from_seed_bytes(&[7u8; 32])?;
//! let response = provider.send(RpcRequest::new(
//!     1,
//!     "did_createJWS",
//!     json!({ "payload": { "hello": "world" }, "did": provider.did() }),
//! ));
//! println!("{}", response.result.unwrap_or_default()["jws"]);
//! # Ok::<(), key_did_provider_ed25519::crypto::KeyError>(())
//! ```
//!
//! ## Architecture
//!
//! - **config**: wire constants. Method names, error codes, JOSE identifiers.
//! - **crypto**: seeds, Ed25519 and X25519 keypairs, the AEAD and KDF.
//! - **identity**: `did:key` encoding and decoding.
//! - **jose**: JWS and JWE envelopes, in both directions.
//! - **rpc**: JSON-RPC types and the dispatcher.
//! - **provider**: the [`Ed25519Provider`] facade and the [`DidProvider`] trait.
//!
//! ## Design Philosophy
//!
//! 1. Secrets never leave the process and never reach a log line.
//! 2. `send` never panics and never fails; every error is a response.
//! 3. No interior mutability beyond one lazily derived key.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod jose;
pub mod provider;
pub mod rpc;

pub use crypto::keys::Seed;
pub use identity::did::encode_did;
pub use provider::{DidProvider, Ed25519Provider};
pub use rpc::types::{RpcError, RpcRequest, RpcResponse};
