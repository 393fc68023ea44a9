//! JSON-RPC surface of the provider: wire types and the dispatcher that
//! executes them.

pub mod dispatch;
pub mod types;

pub use dispatch::{DispatchError, Dispatcher};
pub use types::{
    AuthenticateParams, CreateJwsParams, CreateJwsResult, DecryptJweParams, DecryptJweResult,
    DidMethod, DidRequest, RpcError, RpcRequest, RpcResponse,
};
