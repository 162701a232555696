//! Provider factory for creating RPC providers based on configuration

use std::sync::Arc;

use crate::config::{ProviderType, RpcConfig};
use crate::infrastructure::rpc::error::RpcClientError;
use crate::infrastructure::rpc::providers::{HttpRpcProvider, NodeRpcProvider, RpcProvider};

/// Factory for creating RPC providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider based on the configuration
    pub fn create_provider(config: &RpcConfig) -> Result<Arc<dyn RpcProvider>, RpcClientError> {
        match config.provider_type {
            ProviderType::Node => {
                let provider = NodeRpcProvider::new(
                    config.url(),
                    config.username.clone(),
                    config.password.clone(),
                )?;
                Ok(Arc::new(provider))
            }
            ProviderType::Http => {
                let provider = HttpRpcProvider::new(
                    config.url(),
                    config.username.clone(),
                    config.password.clone(),
                );
                Ok(Arc::new(provider))
            }
        }
    }
}
