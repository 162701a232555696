//! RPC provider implementations
//!
//! A provider only knows how to send one JSON-RPC call to the coin daemon;
//! typed helpers live on [`RpcClient`](super::RpcClient).

pub mod http;
pub mod node;

pub use http::HttpRpcProvider;
pub use node::NodeRpcProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::infrastructure::rpc::error::RpcClientError;

/// Trait for RPC providers (`bitcoincore-rpc` client, raw HTTP)
#[async_trait]
pub trait RpcProvider: Send + Sync + std::fmt::Debug {
    /// Get the provider name for identification
    fn provider_name(&self) -> String;

    /// Issue `method` with positional `params` and return the `result` member
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcClientError>;
}
