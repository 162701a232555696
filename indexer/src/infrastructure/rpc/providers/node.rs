//! Coin daemon provider backed by the `bitcoincore-rpc` client

use async_trait::async_trait;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use serde_json::Value;
use std::sync::Arc;

use super::RpcProvider;
use crate::infrastructure::rpc::error::RpcClientError;

/// Node provider for direct RPC calls
#[derive(Debug)]
pub struct NodeRpcProvider {
    client: Arc<Client>,
    url: String,
}

impl NodeRpcProvider {
    /// Create a new node provider
    pub fn new(url: String, username: String, password: String) -> Result<Self, RpcClientError> {
        let auth = Auth::UserPass(username, password);

        let client =
            Client::new(&url, auth).map_err(|e| RpcClientError::Config(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            url,
        })
    }
}

#[async_trait]
impl RpcProvider for NodeRpcProvider {
    fn provider_name(&self) -> String {
        format!("Node ({})", self.url)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcClientError> {
        let client = self.client.clone();
        let method = method.to_string();

        // The client is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            client
                .call::<Value>(&method, &params)
                .map_err(RpcClientError::Node)
        })
        .await
        .map_err(|e| RpcClientError::Network(e.to_string()))?
    }
}
