use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::RpcConfig;
use crate::domain::models::RpcBlock;
use crate::infrastructure::rpc::error::RpcClientError;
use crate::infrastructure::rpc::provider_factory::ProviderFactory;
use crate::infrastructure::rpc::providers::RpcProvider;
use crate::utils::logging;

/// Client for the coin daemon, wrapping a single provider
#[derive(Debug, Clone)]
pub struct RpcClient {
    provider: Arc<dyn RpcProvider>,
}

impl RpcClient {
    /// Create a new client from configuration
    pub fn new(config: &RpcConfig) -> Result<Self, RpcClientError> {
        let provider = ProviderFactory::create_provider(config)?;
        logging::log_rpc_connection_details(
            &config.url(),
            &config.username,
            &provider.provider_name(),
        );
        Ok(Self { provider })
    }

    /// Create a client over an existing provider
    pub fn with_provider(provider: Arc<dyn RpcProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> String {
        self.provider.provider_name()
    }

    /// Raw `call(method, params)`
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcClientError> {
        self.provider.call(method, params).await
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcClientError> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| RpcClientError::Parse(format!("{} response: {}", method, e)))
    }

    /// Get the current block count
    pub async fn get_block_count(&self) -> Result<u64, RpcClientError> {
        self.call_as("getblockcount", vec![]).await
    }

    /// Get block hash by height
    pub async fn get_block_hash(&self, height: u64) -> Result<String, RpcClientError> {
        self.call_as("getblockhash", vec![json!(height)]).await
    }

    /// Get the verbose block (header fields plus txids) by hash
    pub async fn get_block(&self, block_hash: &str) -> Result<RpcBlock, RpcClientError> {
        self.call_as("getblock", vec![json!(block_hash)]).await
    }

    /// `getrawtransaction [txid]`: the serialized transaction as hex
    pub async fn get_raw_transaction_hex(&self, txid: &str) -> Result<String, RpcClientError> {
        self.call_as("getrawtransaction", vec![json!(txid)]).await
    }

    /// `getrawtransaction [txid, 1]`: hex plus confirmation metadata
    pub async fn get_raw_transaction_verbose(&self, txid: &str) -> Result<Value, RpcClientError> {
        self.call("getrawtransaction", vec![json!(txid), json!(1)])
            .await
    }

    /// `decoderawtransaction [hex]`
    pub async fn decode_raw_transaction(&self, hex: &str) -> Result<Value, RpcClientError> {
        self.call("decoderawtransaction", vec![json!(hex)]).await
    }
}
