//! In-memory ledger backing the integration tests.
//!
//! A unit works on a private copy of the state and swaps it in on commit, so
//! it assumes a single writer (the ingestor serializes its batches). Every
//! store call is appended to a call log, committed or not.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::ledger::{Ledger, LedgerUnit, TransactionStore, UtxoStore};
use crate::domain::models::{SyncState, TransactionRecord, UtxoEntry};
use crate::infrastructure::persistence::error::DbError;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    utxos: BTreeMap<String, UtxoEntry>,
    transactions: BTreeMap<String, TransactionRecord>,
    sync_state: Option<SyncState>,
}

/// A store call as seen by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    InsertMany(Vec<String>),
    Remove(Vec<String>),
    Create(String),
    SaveSyncState(u64),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<MemoryState>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn utxo(&self, id: &str) -> Option<UtxoEntry> {
        self.state.read().await.utxos.get(id).cloned()
    }

    /// All unspent outputs ordered by id
    pub async fn utxos(&self) -> Vec<UtxoEntry> {
        self.state.read().await.utxos.values().cloned().collect()
    }

    pub async fn transaction(&self, txid: &str) -> Option<TransactionRecord> {
        self.state.read().await.transactions.get(txid).cloned()
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }

    /// Balance implied by the UTXO set
    pub async fn balance(&self, address: &str) -> Decimal {
        self.state
            .read()
            .await
            .utxos
            .values()
            .filter(|u| u.address == address)
            .map(|u| u.value)
            .sum()
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, DbError> {
        let working = self.state.read().await.clone();
        Ok(Box::new(MemoryLedgerUnit {
            shared: self.state.clone(),
            calls: self.calls.clone(),
            working: Mutex::new(working),
        }))
    }

    async fn sync_state(&self) -> Result<Option<SyncState>, DbError> {
        Ok(self.state.read().await.sync_state.clone())
    }
}

pub struct MemoryLedgerUnit {
    shared: Arc<RwLock<MemoryState>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    working: Mutex<MemoryState>,
}

impl MemoryLedgerUnit {
    async fn log(&self, call: StoreCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl UtxoStore for MemoryLedgerUnit {
    async fn insert_many(&self, entries: &[UtxoEntry]) -> Result<(), DbError> {
        self.log(StoreCall::InsertMany(
            entries.iter().map(|e| e.id.clone()).collect(),
        ))
        .await;

        let mut working = self.working.lock().await;
        let mut batch = HashSet::new();
        for entry in entries {
            if working.utxos.contains_key(&entry.id) || !batch.insert(entry.id.as_str()) {
                return Err(DbError::DuplicateKey(format!("utxos._id = {}", entry.id)));
            }
        }

        for entry in entries {
            working.utxos.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    async fn remove(&self, ids: &[String]) -> Result<(), DbError> {
        self.log(StoreCall::Remove(ids.to_vec())).await;

        let mut working = self.working.lock().await;
        for id in ids {
            working.utxos.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryLedgerUnit {
    async fn create(&self, record: &TransactionRecord) -> Result<(), DbError> {
        self.log(StoreCall::Create(record.id.clone())).await;

        let mut working = self.working.lock().await;
        if working.transactions.contains_key(&record.id) {
            return Err(DbError::DuplicateKey(format!(
                "transactions._id = {}",
                record.id
            )));
        }
        working
            .transactions
            .insert(record.id.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl LedgerUnit for MemoryLedgerUnit {
    async fn save_sync_state(&self, state: &SyncState) -> Result<(), DbError> {
        self.log(StoreCall::SaveSyncState(state.height)).await;
        self.working.lock().await.sync_state = Some(state.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        let unit = *self;
        let working = unit.working.into_inner();
        *unit.shared.write().await = working;
        Ok(())
    }
}
