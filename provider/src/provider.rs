//! # The Provider
//!
//! [`Ed25519Provider`] is what applications hold: construct it from a seed,
//! read its DID, and hand it JSON-RPC requests through `send`.
//!
//! [`DidProvider`] is the seam for anything that wants "a DID provider"
//! without caring which key type backs it. Implementing the trait is the
//! capability marker.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::config::{PUBLIC_KEY_LENGTH, X25519_KEY_LENGTH};
use crate::crypto::keys::{KeyError, KeyMaterial, Seed};
use crate::rpc::dispatch::Dispatcher;
use crate::rpc::types::{RpcError, RpcRequest, RpcResponse};

/// A DID provider: something that answers DID JSON-RPC requests for one
/// identity.
pub trait DidProvider: Send + Sync {
    /// Always `true`. Lets callers holding a `&dyn DidProvider` check the
    /// capability the way DID clients do.
    fn is_did_provider(&self) -> bool {
        true
    }

    /// The DID requests are answered for.
    fn did(&self) -> &str;

    /// Execute one request. Never fails: errors come back as error responses.
    fn send(&self, request: RpcRequest) -> RpcResponse;
}

/// `did:key` provider backed by a single Ed25519 seed.
///
/// Immutable after construction, so one instance can serve any number of
/// threads at once (`&self` everywhere; the lazily derived encryption key
/// sits behind a `OnceLock`).
pub struct Ed25519Provider {
    keys: KeyMaterial,
}

impl Ed25519Provider {
    /// Capability flag, for callers that check it statically.
    pub const IS_DID_PROVIDER: bool = true;

    /// Build a provider from a seed. Derives the signing key and the DID.
    pub fn new(seed: Seed) -> Self {
        let keys = KeyMaterial::from_seed(seed);
        debug!(did = %keys.did(), "ed25519 provider created");
        Self { keys }
    }

    /// Build from raw seed bytes. Anything other than 32 bytes is rejected.
    pub fn from_seed_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::new(Seed::from_slice(bytes)?))
    }

    /// Build from a hex-encoded seed.
    pub fn from_hex(hex_seed: &str) -> Result<Self, KeyError> {
        Ok(Self::new(Seed::from_hex(hex_seed)?))
    }

    /// The provider's Ed25519 public key.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.keys.signing().public_key()
    }

    /// The provider's X25519 public key, the one JWEs must be addressed to.
    pub fn encryption_public_key(&self) -> [u8; X25519_KEY_LENGTH] {
        self.keys.encryption().public_key()
    }

    /// Handle a request given as an untyped JSON value.
    ///
    /// A value that is not a request object gets `-32600` with a `null` id
    /// (or the object's own `id`, when it has one).
    pub fn send_value(&self, request: Value) -> RpcResponse {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<RpcRequest>(request) {
            Ok(request) => self.send(request),
            Err(e) => {
                debug!(error = %e, "request is not a JSON-RPC object");
                RpcResponse::error(id, RpcError::invalid_request(e.to_string()))
            }
        }
    }

    /// Handle a request given as JSON text. Unparseable text gets `-32700`.
    pub fn send_str(&self, request: &str) -> RpcResponse {
        match serde_json::from_str::<Value>(request) {
            Ok(value) => self.send_value(value),
            Err(e) => {
                debug!(error = %e, "request is not valid JSON");
                RpcResponse::error(Value::Null, RpcError::parse_error())
            }
        }
    }
}

impl DidProvider for Ed25519Provider {
    fn did(&self) -> &str {
        self.keys.did()
    }

    fn send(&self, request: RpcRequest) -> RpcResponse {
        Dispatcher::new(&self.keys).dispatch(request)
    }
}

impl fmt::Debug for Ed25519Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Provider")
            .field("did", &self.keys.did())
            .finish_non_exhaustive()
    }
}
