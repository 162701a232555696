//! PostgreSQL ledger: one database transaction per ledger unit

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::domain::ledger::{Ledger, LedgerUnit, TransactionStore, UtxoStore};
use crate::domain::models::{SyncState, TransactionRecord, UtxoEntry};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::{
    sync_state_repository, transaction_repository, utxo_repository,
};

#[derive(Clone)]
pub struct PgLedger {
    conn: DatabaseConnection,
}

impl PgLedger {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, DbError> {
        let txn = self.conn.begin().await?;
        Ok(Box::new(PgLedgerUnit { txn }))
    }

    async fn sync_state(&self) -> Result<Option<SyncState>, DbError> {
        sync_state_repository::load(&self.conn).await
    }
}

/// Rolled back by SeaORM when dropped without [`LedgerUnit::commit`]
pub struct PgLedgerUnit {
    txn: DatabaseTransaction,
}

#[async_trait]
impl UtxoStore for PgLedgerUnit {
    async fn insert_many(&self, entries: &[UtxoEntry]) -> Result<(), DbError> {
        utxo_repository::insert_many(&self.txn, entries).await
    }

    async fn remove(&self, ids: &[String]) -> Result<(), DbError> {
        utxo_repository::remove(&self.txn, ids).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for PgLedgerUnit {
    async fn create(&self, record: &TransactionRecord) -> Result<(), DbError> {
        transaction_repository::create(&self.txn, record).await
    }
}

#[async_trait]
impl LedgerUnit for PgLedgerUnit {
    async fn save_sync_state(&self, state: &SyncState) -> Result<(), DbError> {
        sync_state_repository::save(&self.txn, state).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        let unit = *self;
        unit.txn.commit().await?;
        Ok(())
    }
}
