//! Loosely-typed transaction payloads as returned by `decoderawtransaction`.
//!
//! Daemons disagree on which fields they send (and older forks send `null`
//! for empty lists), so every collection here tolerates being absent.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::utxo::utxo_key;

/// A decoded transaction straight from the node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vin: Vec<RawInput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vout: Vec<RawOutput>,
}

/// One entry of `vin`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
}

impl RawInput {
    /// A coinbase input carries a non-empty `coinbase` script instead of a prevout.
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// `"<txid>:<vout>"` of the output this input spends, if it references one.
    pub fn spent_key(&self) -> Option<String> {
        match (&self.txid, self.vout) {
            (Some(txid), Some(vout)) => Some(utxo_key(txid, vout)),
            _ => None,
        }
    }
}

/// One entry of `vout`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    #[serde(default)]
    pub value: Decimal,
    pub n: u32,
    #[serde(rename = "scriptPubKey", default)]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub addresses: Vec<String>,
    /// Newer daemons report a single `address` instead of `addresses`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ScriptPubKey {
    pub fn first_address(&self) -> Option<&str> {
        self.addresses
            .first()
            .map(String::as_str)
            .or(self.address.as_deref())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
