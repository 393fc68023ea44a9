//! # JSON-RPC Wire Types
//!
//! Request/response envelopes and the typed parameter structs for each DID
//! method. The envelope keeps `method` as a plain string so an unknown
//! method still parses and gets a proper "method not found" response
//! instead of a deserialization failure.
//!
//! ## Method Index
//!
//! | Method             | Params                              | Result                 |
//! |--------------------|-------------------------------------|------------------------|
//! | `did_createJWS`    | `payload`, `protected?`, `did`      | `{ jws }` (compact)    |
//! | `did_decryptJWE`   | `jwe`, `did?`                       | `{ cleartext }` (b64)  |
//! | `did_authenticate` | `aud`, `nonce`, `paths?`            | general JWS            |

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{
    DECRYPT_FAILED_MESSAGE, ERROR_DECRYPT_FAILED, ERROR_INTERNAL, ERROR_INVALID_PARAMS,
    ERROR_INVALID_REQUEST, ERROR_METHOD_NOT_FOUND, ERROR_PARSE, JSON_RPC_VERSION,
    METHOD_AUTHENTICATE, METHOD_CREATE_JWS, METHOD_DECRYPT_JWE,
};

// ---------------------------------------------------------------------------
// Method Enumeration
// ---------------------------------------------------------------------------

/// The fixed set of methods a DID provider answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DidMethod {
    /// Sign a payload as a JWS.
    #[serde(rename = "did_createJWS")]
    CreateJws,
    /// Decrypt a JWE addressed to the provider.
    #[serde(rename = "did_decryptJWE")]
    DecryptJwe,
    /// Sign an authentication response for a relying party.
    #[serde(rename = "did_authenticate")]
    Authenticate,
}

impl DidMethod {
    /// All supported methods.
    pub const ALL: [DidMethod; 3] = [
        DidMethod::CreateJws,
        DidMethod::DecryptJwe,
        DidMethod::Authenticate,
    ];

    /// Look a method up by its wire name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            METHOD_CREATE_JWS => Some(DidMethod::CreateJws),
            METHOD_DECRYPT_JWE => Some(DidMethod::DecryptJwe),
            METHOD_AUTHENTICATE => Some(DidMethod::Authenticate),
            _ => None,
        }
    }

    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DidMethod::CreateJws => METHOD_CREATE_JWS,
            DidMethod::DecryptJwe => METHOD_DECRYPT_JWE,
            DidMethod::Authenticate => METHOD_AUTHENTICATE,
        }
    }
}

impl std::fmt::Display for DidMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Typed Parameters
// ---------------------------------------------------------------------------

/// Parameters of `did_createJWS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJwsParams {
    /// Anything JSON. Required, but may be `null`.
    pub payload: Value,
    /// Extra protected header fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<Map<String, Value>>,
    /// Caller-supplied DID, used to build the `kid`. Not checked against
    /// the provider's own DID.
    pub did: String,
}

/// Parameters of `did_decryptJWE`.
///
/// `jwe` stays an untyped value here: a JWE that does not parse is a
/// decryption failure, not an invalid-params error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptJweParams {
    pub jwe: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
}

/// Parameters of `did_authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateParams {
    /// Audience, usually the relying party's origin.
    pub aud: String,
    /// Challenge nonce chosen by the relying party.
    pub nonce: String,
    /// Resource paths the authentication is scoped to.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// A request routed to its method with parameters already typed.
#[derive(Debug, Clone, PartialEq)]
pub enum DidRequest {
    CreateJws(CreateJwsParams),
    DecryptJwe(DecryptJweParams),
    Authenticate(AuthenticateParams),
}

/// Why a `(method, params)` pair could not become a [`DidRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownMethod(String),
    InvalidParams(String),
}

impl DidRequest {
    /// Route by method name and parse the params for that method.
    pub fn parse(method: &str, params: Value) -> Result<Self, RouteError> {
        let method =
            DidMethod::from_name(method).ok_or_else(|| RouteError::UnknownMethod(method.into()))?;
        Ok(match method {
            DidMethod::CreateJws => DidRequest::CreateJws(parse_params(params)?),
            DidMethod::DecryptJwe => DidRequest::DecryptJwe(parse_params(params)?),
            DidMethod::Authenticate => DidRequest::Authenticate(parse_params(params)?),
        })
    }

    pub fn method(&self) -> DidMethod {
        match self {
            DidRequest::CreateJws(_) => DidMethod::CreateJws,
            DidRequest::DecryptJwe(_) => DidMethod::DecryptJwe,
            DidRequest::Authenticate(_) => DidMethod::Authenticate,
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RouteError> {
    serde_json::from_value(params).map_err(|e| RouteError::InvalidParams(e.to_string()))
}

// ---------------------------------------------------------------------------
// Typed Results
// ---------------------------------------------------------------------------

/// Result of `did_createJWS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJwsResult {
    /// Compact serialization.
    pub jws: String,
}

/// Result of `did_decryptJWE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptJweResult {
    /// Standard base64 with padding.
    pub cleartext: String,
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
///
/// `id` is opaque and echoed back untouched, whatever its JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version. Must be "2.0".
    pub jsonrpc: String,
    /// Request identifier. Defaults to `null` when absent.
    #[serde(default)]
    pub id: Value,
    /// Wire name of the method to invoke.
    pub method: String,
    /// Method-specific parameters.
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    /// Build a "2.0" request.
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` is set; the constructors are the only
/// way this crate builds one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// The request ID this response corresponds to.
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Creates a successful response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object.
///
/// Codes:
/// - `-32700`: Parse error
/// - `-32600`: Invalid request
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
/// - `-32000`: Failed to decrypt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Input was not valid JSON.
    pub fn parse_error() -> Self {
        Self {
            code: ERROR_PARSE,
            message: "Parse error".to_string(),
            data: None,
        }
    }

    /// Input was JSON but not a valid request object.
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self {
            code: ERROR_INVALID_REQUEST,
            message: "Invalid Request".to_string(),
            data: Some(Value::String(detail.into())),
        }
    }

    /// The requested method does not exist.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self {
            code: ERROR_METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method.into()),
            data: None,
        }
    }

    /// Params missing or of the wrong shape.
    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self {
            code: ERROR_INVALID_PARAMS,
            message: "Invalid params".to_string(),
            data: Some(Value::String(detail.into())),
        }
    }

    /// Something broke on our side. No detail goes out.
    pub fn internal_error() -> Self {
        Self {
            code: ERROR_INTERNAL,
            message: "Internal error".to_string(),
            data: None,
        }
    }

    /// The JWE could not be decrypted. Same code, same message, every time.
    pub fn decryption_failed() -> Self {
        Self {
            code: ERROR_DECRYPT_FAILED,
            message: DECRYPT_FAILED_MESSAGE.to_string(),
            data: None,
        }
    }
}

impl From<RouteError> for RpcError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::UnknownMethod(method) => RpcError::method_not_found(method),
            RouteError::InvalidParams(detail) => RpcError::invalid_params(detail),
        }
    }
}
