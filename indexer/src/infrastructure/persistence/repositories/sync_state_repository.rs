//! Repository for the sync cursor

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait};

use crate::domain::models::SyncState;
use crate::infrastructure::persistence::entities::sync_state;
use crate::infrastructure::persistence::error::DbError;

const CHAIN_CURSOR: &str = "chain";

/// Upsert the chain cursor
pub async fn save<C: ConnectionTrait>(db: &C, state: &SyncState) -> Result<(), DbError> {
    let model = sync_state::ActiveModel {
        id: Set(CHAIN_CURSOR.to_string()),
        height: Set(state.height as i64),
        block_hash: Set(state.block_hash.clone()),
        updated_at: Set(Utc::now().into()),
    };

    sync_state::Entity::insert(model)
        .on_conflict(
            OnConflict::column(sync_state::Column::Id)
                .update_columns([
                    sync_state::Column::Height,
                    sync_state::Column::BlockHash,
                    sync_state::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

pub async fn load<C: ConnectionTrait>(db: &C) -> Result<Option<SyncState>, DbError> {
    let result = sync_state::Entity::find_by_id(CHAIN_CURSOR.to_string())
        .one(db)
        .await?;

    Ok(result.map(|m| SyncState {
        height: m.height as u64,
        block_hash: m.block_hash,
    }))
}
