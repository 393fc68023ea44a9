//! # Request Dispatch
//!
//! Turns one [`RpcRequest`] into one [`RpcResponse`]:
//!
//! 1. check the envelope (`jsonrpc` must be "2.0"),
//! 2. route the method and type its params ([`DidRequest::parse`]),
//! 3. run the handler against the borrowed [`KeyMaterial`],
//! 4. wrap the result or error, echoing `id`.
//!
//! The dispatcher holds no state of its own. Every failure becomes an error
//! response; nothing here panics or returns early without one.
//!
//! Every decryption failure produces `-32000 "Failed to decrypt"` on the
//! wire, whether the JWE was malformed, addressed to someone else or
//! tampered with. The cause is logged at `debug`.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{AUTH_RESPONSE_TTL, JSON_RPC_VERSION};
use crate::crypto::keys::KeyMaterial;
use crate::identity::did::key_id;
use crate::jose::encoding::base64pad_encode;
use crate::jose::jwe::{decrypt_jwe, Jwe, JweError};
use crate::jose::jws::{create_jws, GeneralJws, JwsError};
use crate::rpc::types::{
    AuthenticateParams, CreateJwsParams, CreateJwsResult, DecryptJweParams, DecryptJweResult,
    DidRequest, RouteError, RpcError, RpcRequest, RpcResponse,
};

/// Failures inside a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("failed to decrypt: {0}")]
    DecryptionFailed(#[source] JweError),

    #[error("signing failed: {0}")]
    Signing(#[from] JwsError),

    #[error("failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RouteError> for DispatchError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::UnknownMethod(method) => DispatchError::MethodNotFound(method),
            RouteError::InvalidParams(detail) => DispatchError::InvalidParams(detail),
        }
    }
}

impl From<DispatchError> for RpcError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::InvalidRequest(detail) => RpcError::invalid_request(detail),
            DispatchError::MethodNotFound(method) => RpcError::method_not_found(method),
            DispatchError::InvalidParams(detail) => RpcError::invalid_params(detail),
            DispatchError::DecryptionFailed(_) => RpcError::decryption_failed(),
            DispatchError::Signing(_) | DispatchError::Serialization(_) => {
                RpcError::internal_error()
            }
        }
    }
}

/// Executes DID requests against borrowed key material.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    keys: &'a KeyMaterial,
}

impl<'a> Dispatcher<'a> {
    pub fn new(keys: &'a KeyMaterial) -> Self {
        Self { keys }
    }

    /// Handle one request. Always produces exactly one response.
    pub fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let RpcRequest {
            jsonrpc,
            id,
            method,
            params,
        } = request;

        match self.execute(&jsonrpc, &method, params) {
            Ok(result) => {
                debug!(%method, %id, "request handled");
                RpcResponse::success(id, result)
            }
            Err(e) => {
                match &e {
                    DispatchError::DecryptionFailed(cause) => {
                        debug!(%method, %id, %cause, "decryption failed")
                    }
                    DispatchError::Signing(_) | DispatchError::Serialization(_) => {
                        warn!(%method, %id, error = %e, "internal error")
                    }
                    _ => debug!(%method, %id, error = %e, "request rejected"),
                }
                RpcResponse::error(id, e.into())
            }
        }
    }

    fn execute(&self, jsonrpc: &str, method: &str, params: Value) -> Result<Value, DispatchError> {
        if jsonrpc != JSON_RPC_VERSION {
            return Err(DispatchError::InvalidRequest(format!(
                "jsonrpc must be \"{JSON_RPC_VERSION}\""
            )));
        }

        match DidRequest::parse(method, params)? {
            DidRequest::CreateJws(params) => to_result(self.create_jws(params)?),
            DidRequest::DecryptJwe(params) => to_result(self.decrypt_jwe(params)?),
            DidRequest::Authenticate(params) => to_result(self.authenticate(params)?),
        }
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// `did_createJWS`: sign `payload` with `kid` built from the caller's DID.
    fn create_jws(&self, params: CreateJwsParams) -> Result<CreateJwsResult, DispatchError> {
        let CreateJwsParams {
            payload,
            protected,
            did,
        } = params;

        if did.split('#').next() != Some(self.keys.did()) {
            debug!(requested = %did, "createJWS for a DID other than the provider's own");
        }

        let mut header = protected.unwrap_or_default();
        header.insert("kid".into(), Value::String(key_id(&did)));

        let jws = create_jws(self.keys.signing(), &payload, header)?;
        Ok(CreateJwsResult { jws })
    }

    /// `did_decryptJWE`: open a JWE addressed to the provider's X25519 key.
    fn decrypt_jwe(&self, params: DecryptJweParams) -> Result<DecryptJweResult, DispatchError> {
        let jwe = Jwe::from_value(params.jwe).map_err(DispatchError::DecryptionFailed)?;
        let cleartext = decrypt_jwe(&jwe, self.keys.encryption())
            .map_err(DispatchError::DecryptionFailed)?;
        Ok(DecryptJweResult {
            cleartext: base64pad_encode(cleartext),
        })
    }

    /// `did_authenticate`: sign a short-lived response to a relying party's
    /// challenge, returned as a general JWS.
    fn authenticate(&self, params: AuthenticateParams) -> Result<GeneralJws, DispatchError> {
        let did = self.keys.did();
        let exp = Utc::now().timestamp() + AUTH_RESPONSE_TTL.as_secs() as i64;
        let payload = json!({
            "did": did,
            "aud": params.aud,
            "nonce": params.nonce,
            "paths": params.paths,
            "exp": exp,
        });

        let mut header = serde_json::Map::new();
        header.insert("kid".into(), Value::String(key_id(did)));

        let jws = create_jws(self.keys.signing(), &payload, header)?;
        Ok(GeneralJws::from_compact(&jws)?)
    }
}

fn to_result<T: Serialize>(result: T) -> Result<Value, DispatchError> {
    Ok(serde_json::to_value(result)?)
}
