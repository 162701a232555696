use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::raw_transaction::RawInput;

/// Projection of one raw input onto the stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub coinbase: Option<String>,
    pub sequence: Option<u64>,
    pub tx_id: Option<String>,
    pub vout: Option<u32>,
}

impl From<&RawInput> for TransactionInput {
    fn from(input: &RawInput) -> Self {
        Self {
            coinbase: input.coinbase.clone(),
            sequence: input.sequence,
            tx_id: input.txid.clone(),
            vout: input.vout,
        }
    }
}

/// An output as shown on the transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub block_height: u64,
    pub address: String,
    pub n: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

/// Normalized transaction, written exactly once per ingested transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub block_hash: String,
    pub block_height: u64,
    pub created_at: DateTime<Utc>,
    pub tx_id: String,
    pub version: i32,
    pub vin: Vec<TransactionInput>,
    pub vout: Vec<TransactionOutput>,
    /// Always `false` for proof-of-work blocks
    pub is_reward: bool,
}

impl TransactionRecord {
    /// Sum of the outputs shown on the record
    pub fn total_out(&self) -> Decimal {
        self.vout.iter().map(|o| o.value).sum()
    }
}
