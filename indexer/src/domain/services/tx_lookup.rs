use serde_json::Value;

use crate::domain::errors::LookupError;
use crate::domain::models::RawTransaction;
use crate::infrastructure::rpc::RpcClient;

/// Metadata `decoderawtransaction` does not report, copied over from the
/// verbose `getrawtransaction` answer.
const VERBOSE_FIELDS: [&str; 3] = ["confirmations", "time", "blocktime"];

/// Fetches and decodes transactions from the node
#[derive(Debug, Clone)]
pub struct TxLookup {
    rpc: RpcClient,
}

impl TxLookup {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Decoded transaction for `txhash`.
    ///
    /// With `verbose`, the result also carries `confirmations`, `time` and
    /// `blocktime` whenever the node reported them (unconfirmed transactions
    /// have none of the three).
    pub async fn get_tx(&self, txhash: &str, verbose: bool) -> Result<Value, LookupError> {
        if !verbose {
            let hex = self.rpc.get_raw_transaction_hex(txhash).await?;
            return Ok(self.rpc.decode_raw_transaction(&hex).await?);
        }

        let details = self.rpc.get_raw_transaction_verbose(txhash).await?;
        let hex = details
            .get("hex")
            .and_then(Value::as_str)
            .ok_or_else(|| LookupError::Malformed(format!("no hex for transaction {}", txhash)))?;

        let mut decoded = self.rpc.decode_raw_transaction(hex).await?;
        let fields = decoded.as_object_mut().ok_or_else(|| {
            LookupError::Malformed(format!("decoded transaction {} is not an object", txhash))
        })?;

        for key in VERBOSE_FIELDS {
            if let Some(value) = details.get(key) {
                fields.insert(key.to_string(), value.clone());
            }
        }

        Ok(decoded)
    }

    /// Non-verbose lookup deserialized for the ingestion pipeline
    pub async fn get_raw_transaction(&self, txhash: &str) -> Result<RawTransaction, LookupError> {
        let decoded = self.get_tx(txhash, false).await?;
        serde_json::from_value(decoded)
            .map_err(|e| LookupError::Malformed(format!("transaction {}: {}", txhash, e)))
    }
}
