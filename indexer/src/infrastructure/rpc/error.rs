use thiserror::Error;

/// Represents errors that can occur while talking to the coin daemon
#[derive(Debug, Error)]
pub enum RpcClientError {
    /// Error from the `bitcoincore-rpc` client
    #[error("Node RPC error: {0}")]
    Node(#[from] bitcoincore_rpc::Error),
    /// Transport failure (connection refused, timeout, worker panic)
    #[error("Network error: {0}")]
    Network(String),
    /// The daemon answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The response could not be read
    #[error("Parse error: {0}")]
    Parse(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RpcClientError {
    fn from(error: reqwest::Error) -> Self {
        RpcClientError::Network(error.to_string())
    }
}
