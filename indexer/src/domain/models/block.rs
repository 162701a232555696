use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The containing block of an ingested transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub height: u64,
    pub created_at: DateTime<Utc>,
}

impl Block {
    pub fn new(hash: impl Into<String>, height: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            hash: hash.into(),
            height,
            created_at,
        }
    }
}

/// Verbose `getblock` payload, trimmed to what the sync driver reads
#[derive(Debug, Clone, Deserialize)]
pub struct RpcBlock {
    pub hash: String,
    pub height: u64,
    pub time: i64,
    #[serde(default)]
    pub tx: Vec<String>,
    /// PoS daemons tag blocks with `proof-of-stake` / `proof-of-work`
    #[serde(default)]
    pub flags: Option<String>,
}

impl RpcBlock {
    /// Converts to a [`Block`], or `None` when `time` is out of range.
    pub fn to_block(&self) -> Option<Block> {
        let created_at = Utc.timestamp_opt(self.time, 0).single()?;
        Some(Block::new(self.hash.clone(), self.height, created_at))
    }
}

/// Last block fully committed by the sync driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub height: u64,
    pub block_hash: String,
}
