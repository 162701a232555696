use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait};

use crate::domain::models::TransactionRecord;
use crate::infrastructure::persistence::entities::transactions;
use crate::infrastructure::persistence::error::DbError;

/// Insert a transaction record. A second record with the same txid fails with
/// [`DbError::DuplicateKey`]; nothing is overwritten.
pub async fn create<C: ConnectionTrait>(db: &C, record: &TransactionRecord) -> Result<(), DbError> {
    let tx_model = transactions::ActiveModel {
        id: Set(record.id.clone()),
        block_hash: Set(record.block_hash.clone()),
        block_height: Set(record.block_height as i64),
        created_at: Set(record.created_at.into()),
        version: Set(record.version),
        vin: Set(to_json(&record.vin)?),
        vout: Set(to_json(&record.vout)?),
        is_reward: Set(record.is_reward),
    };

    transactions::Entity::insert(tx_model).exec(db).await?;

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(value).map_err(|e| DbError::Other(format!("serialize: {}", e)))
}

/// Repository for transaction record reads
#[derive(Clone)]
pub struct TransactionRepository {
    conn: DatabaseConnection,
}

impl TransactionRepository {
    /// Create a new TransactionRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a transaction record by its transaction ID
    pub async fn get_by_txid(&self, txid: &str) -> Result<Option<TransactionRecord>, DbError> {
        let result = transactions::Entity::find_by_id(txid.to_string())
            .one(&self.conn)
            .await?;

        result.map(to_domain_model).transpose()
    }
}

/// Convert a database entity to a domain model
fn to_domain_model(entity: transactions::Model) -> Result<TransactionRecord, DbError> {
    let vin = serde_json::from_value(entity.vin)
        .map_err(|e| DbError::Other(format!("vin of {}: {}", entity.id, e)))?;
    let vout = serde_json::from_value(entity.vout)
        .map_err(|e| DbError::Other(format!("vout of {}: {}", entity.id, e)))?;

    Ok(TransactionRecord {
        tx_id: entity.id.clone(),
        id: entity.id,
        block_hash: entity.block_hash,
        block_height: entity.block_height as u64,
        created_at: entity.created_at.into(),
        version: entity.version,
        vin,
        vout,
        is_reward: entity.is_reward,
    })
}
