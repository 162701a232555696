//! Plain JSON-RPC over HTTP, for daemons the `bitcoincore-rpc` client
//! cannot talk to (or gateways in front of them)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::RpcProvider;
use crate::infrastructure::rpc::error::RpcClientError;

/// HTTP provider for JSON-RPC calls
#[derive(Debug)]
pub struct HttpRpcProvider {
    endpoint: String,
    username: String,
    password: String,
    client: Client,
}

impl HttpRpcProvider {
    /// Create a new HTTP provider
    pub fn new(endpoint: String, username: String, password: String) -> Self {
        Self {
            endpoint,
            username,
            password,
            client: Client::new(),
        }
    }
}

/// Pull `result` out of a JSON-RPC response body, or turn `error` into an
/// [`RpcClientError::Rpc`].
pub(crate) fn unwrap_response(response_json: Value) -> Result<Value, RpcClientError> {
    if let Some(error) = response_json.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(RpcClientError::Rpc { code, message });
    }

    response_json
        .get("result")
        .cloned()
        .ok_or_else(|| RpcClientError::Parse("No result in response".to_string()))
}

#[async_trait]
impl RpcProvider for HttpRpcProvider {
    fn provider_name(&self) -> String {
        format!("HTTP ({})", self.endpoint)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcClientError> {
        let request_body = json!({
            "jsonrpc": "1.0",
            "id": "explorer-indexer",
            "method": method,
            "params": params
        });

        // Daemons report RPC errors with a 500 status and a JSON body, so the
        // body is read regardless of status
        let response_text = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request_body)
            .send()
            .await?
            .text()
            .await?;

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| RpcClientError::Parse(format!("{}: {}", e, response_text)))?;

        unwrap_response(response_json)
    }
}
