pub mod client;
mod error;
mod provider_factory;
pub mod providers;

pub use client::RpcClient;
pub use error::RpcClientError;
pub use provider_factory::ProviderFactory;
pub use providers::{HttpRpcProvider, NodeRpcProvider, RpcProvider};
