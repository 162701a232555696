use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::ledger::PgLedger;
use crate::infrastructure::persistence::repositories::{
    Repositories, TransactionRepository, UtxoRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all read repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_transaction_repository(conn.clone()),
            Self::create_utxo_repository(conn),
        )
    }

    /// Create the ledger the ingestion pipeline writes through
    pub fn create_ledger(db_pool: &DbPool) -> PgLedger {
        PgLedger::new(db_pool.get_connection().clone())
    }

    /// Create a transaction repository
    pub fn create_transaction_repository(conn: DatabaseConnection) -> TransactionRepository {
        TransactionRepository::new(conn)
    }

    /// Create a utxo repository
    pub fn create_utxo_repository(conn: DatabaseConnection) -> UtxoRepository {
        UtxoRepository::new(conn)
    }
}
