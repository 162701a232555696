#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use explorer_indexer::domain::models::{Block, RawTransaction};
use explorer_indexer::domain::services::ChainClassifier;
use explorer_indexer::infrastructure::rpc::{RpcClient, RpcClientError, RpcProvider};

pub const GENESIS_TIME: i64 = 1_600_000_000;

pub fn block(height: u64) -> Block {
    Block::new(
        block_hash(height),
        height,
        Utc.timestamp_opt(GENESIS_TIME + height as i64 * 60, 0).unwrap(),
    )
}

pub fn block_hash(height: u64) -> String {
    format!("{:064x}", height)
}

pub fn raw(value: Value) -> RawTransaction {
    serde_json::from_value(value).unwrap()
}

pub fn spend(txid: &str, vout: u32) -> Value {
    json!({ "txid": txid, "vout": vout, "sequence": 4294967295u64 })
}

pub fn coinbase_input() -> Value {
    json!({ "coinbase": "03a08601", "sequence": 4294967295u64 })
}

pub fn pay(n: u32, value: f64, address: &str) -> Value {
    json!({
        "value": value,
        "n": n,
        "scriptPubKey": { "type": "pubkeyhash", "addresses": [address] }
    })
}

pub fn script_out(n: u32, value: f64, kind: &str) -> Value {
    json!({ "value": value, "n": n, "scriptPubKey": { "type": kind } })
}

pub fn tx(txid: &str, vin: Vec<Value>, vout: Vec<Value>) -> Value {
    json!({ "txid": txid, "version": 1, "vin": vin, "vout": vout })
}

/// Coinstake spending `prev:0`, with the empty marker first
pub fn coinstake(txid: &str, prev: &str, staker: &str, reward: f64) -> Value {
    tx(
        txid,
        vec![spend(prev, 0)],
        vec![script_out(0, 0.0, "nonstandard"), pay(1, reward, staker)],
    )
}

/// Placeholder transaction PoS daemons put first in a block
pub fn empty_stake(txid: &str) -> Value {
    tx(txid, vec![coinbase_input()], vec![script_out(0, 0.0, "nonstandard")])
}

/// Classifier with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier(pub bool);

impl ChainClassifier for FixedClassifier {
    fn is_reward_raw_transaction(&self, _rpctx: &RawTransaction) -> bool {
        self.0
    }
}

/// Scripted node: answers calls from a table keyed by method and params
#[derive(Debug, Default)]
pub struct FakeRpcProvider {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeRpcProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn key(method: &str, params: &[Value]) -> String {
        format!("{}{}", method, Value::Array(params.to_vec()))
    }

    pub fn respond(&self, method: &str, params: Vec<Value>, result: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(Self::key(method, &params), result);
    }

    /// Make the next `times` calls of `method` fail with a transport error
    pub fn fail(&self, method: &str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(method.to_string(), times);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }

    /// Register `txs` as block `height`, reachable the way the sync driver
    /// walks the chain, and move the tip to it.
    pub fn add_block(&self, height: u64, flags: Option<&str>, txs: Vec<Value>) {
        let hash = block_hash(height);
        let txids: Vec<Value> = txs.iter().map(|t| t["txid"].clone()).collect();

        let mut getblock = json!({
            "hash": hash,
            "height": height,
            "time": GENESIS_TIME + height as i64 * 60,
            "tx": txids,
        });
        if let Some(flags) = flags {
            getblock["flags"] = json!(flags);
        }

        self.respond("getblockhash", vec![json!(height)], json!(hash));
        self.respond("getblock", vec![json!(hash)], getblock);
        for t in txs {
            self.add_transaction(t);
        }

        let tip = self
            .responses
            .lock()
            .unwrap()
            .get(&Self::key("getblockcount", &[]))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        self.respond("getblockcount", vec![], json!(tip.max(height)));
    }

    pub fn add_transaction(&self, decoded: Value) {
        let txid = decoded["txid"].as_str().unwrap().to_string();
        let hex = format!("hex-{}", txid);
        self.respond("getrawtransaction", vec![json!(txid)], json!(hex));
        self.respond("decoderawtransaction", vec![json!(hex)], decoded);
    }
}

#[async_trait]
impl RpcProvider for FakeRpcProvider {
    fn provider_name(&self) -> String {
        "fake".to_string()
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if let Some(left) = self.failures.lock().unwrap().get_mut(method) {
            if *left > 0 {
                *left -= 1;
                return Err(RpcClientError::Network(format!("{} unavailable", method)));
            }
        }

        self.responses
            .lock()
            .unwrap()
            .get(&Self::key(method, &params))
            .cloned()
            .ok_or_else(|| RpcClientError::Rpc {
                code: -5,
                message: format!("no answer for {} {:?}", method, params),
            })
    }
}

pub fn client(provider: &Arc<FakeRpcProvider>) -> RpcClient {
    RpcClient::with_provider(provider.clone())
}
