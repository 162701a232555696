//! Store seams consumed by the ingestion pipeline.
//!
//! Every mutation goes through a [`LedgerUnit`]: nothing staged in a unit is
//! visible to readers until [`LedgerUnit::commit`], and a unit dropped without
//! committing is rolled back.

use async_trait::async_trait;

use crate::domain::models::{SyncState, TransactionRecord, UtxoEntry};
use crate::infrastructure::persistence::error::DbError;

/// Keyed collection of unspent outputs
#[async_trait]
pub trait UtxoStore: Send + Sync {
    /// Bulk insert. Fails on an `_id` that already exists.
    async fn insert_many(&self, entries: &[UtxoEntry]) -> Result<(), DbError>;

    /// Bulk delete by `_id`. Unknown ids are ignored.
    async fn remove(&self, ids: &[String]) -> Result<(), DbError>;
}

/// Keyed collection of transaction records
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a record. Fails with [`DbError::DuplicateKey`], never overwrites.
    async fn create(&self, record: &TransactionRecord) -> Result<(), DbError>;
}

/// One all-or-nothing batch of store mutations
#[async_trait]
pub trait LedgerUnit: UtxoStore + TransactionStore {
    /// Stage the sync cursor so it lands together with the block's writes.
    async fn save_sync_state(&self, state: &SyncState) -> Result<(), DbError>;

    async fn commit(self: Box<Self>) -> Result<(), DbError>;
}

/// Factory for ledger units plus the committed sync cursor
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, DbError>;

    async fn sync_state(&self) -> Result<Option<SyncState>, DbError>;
}
