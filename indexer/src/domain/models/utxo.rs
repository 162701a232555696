use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One unspent output, keyed by `"<txid>:<n>"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub tx_id: String,
    pub n: u32,
    pub address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub block_height: u64,
}

impl UtxoEntry {
    pub fn new(tx_id: &str, n: u32, address: String, value: Decimal, block_height: u64) -> Self {
        Self {
            id: utxo_key(tx_id, n),
            tx_id: tx_id.to_string(),
            n,
            address,
            value,
            block_height,
        }
    }
}

pub fn utxo_key(tx_id: &str, n: u32) -> String {
    format!("{}:{}", tx_id, n)
}
