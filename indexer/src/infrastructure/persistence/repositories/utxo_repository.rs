use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::fmt;

use crate::domain::models::UtxoEntry;
use crate::infrastructure::persistence::entities::utxos;
use crate::infrastructure::persistence::error::DbError;

/// Rows per statement, to keep bulk statements bounded
const CHUNK_SIZE: usize = 500;

/// Insert UTXO rows. Any id that already exists fails the statement.
pub async fn insert_many<C: ConnectionTrait>(db: &C, entries: &[UtxoEntry]) -> Result<(), DbError> {
    for chunk in entries.chunks(CHUNK_SIZE) {
        let models: Vec<utxos::ActiveModel> = chunk
            .iter()
            .map(|u| utxos::ActiveModel {
                id: Set(u.id.clone()),
                txid: Set(u.tx_id.clone()),
                n: Set(u.n as i32),
                address: Set(u.address.clone()),
                value: Set(u.value),
                block_height: Set(u.block_height as i64),
            })
            .collect();

        utxos::Entity::insert_many(models).exec(db).await?;
    }

    Ok(())
}

/// Delete UTXO rows by id, returning how many existed
pub async fn remove<C: ConnectionTrait>(db: &C, ids: &[String]) -> Result<u64, DbError> {
    let mut total_deleted = 0u64;
    for chunk in ids.chunks(CHUNK_SIZE) {
        let result = utxos::Entity::delete_many()
            .filter(utxos::Column::Id.is_in(chunk.to_vec()))
            .exec(db)
            .await?;

        total_deleted += result.rows_affected;
    }

    Ok(total_deleted)
}

/// Repository for UTXO reads (balances, richlist)
#[derive(Clone)]
pub struct UtxoRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for UtxoRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtxoRepository").finish_non_exhaustive()
    }
}

impl UtxoRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Unspent outputs held by `address`, oldest first
    pub async fn find_by_address(&self, address: &str) -> Result<Vec<UtxoEntry>, DbError> {
        let results = utxos::Entity::find()
            .filter(utxos::Column::Address.eq(address))
            .order_by_asc(utxos::Column::BlockHeight)
            .order_by_asc(utxos::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(results.into_iter().map(to_domain_model).collect())
    }
}

fn to_domain_model(entity: utxos::Model) -> UtxoEntry {
    UtxoEntry {
        id: entity.id,
        tx_id: entity.txid,
        n: entity.n as u32,
        address: entity.address,
        value: entity.value,
        block_height: entity.block_height as u64,
    }
}
