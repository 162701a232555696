use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Normalized transaction records, one per ingested transaction
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::BlockHash).string_len(64).not_null())
                    .col(ColumnDef::new(Transactions::BlockHeight).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Version).integer().not_null())
                    .col(ColumnDef::new(Transactions::Vin).json().not_null())
                    .col(ColumnDef::new(Transactions::Vout).json().not_null())
                    .col(
                        ColumnDef::new(Transactions::IsReward)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_block_height")
                    .table(Transactions::Table)
                    .col(Transactions::BlockHeight)
                    .to_owned(),
            )
            .await?;

        // Unspent outputs keyed by "<txid>:<n>"
        manager
            .create_table(
                Table::create()
                    .table(Utxos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Utxos::Id)
                            .string_len(80)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Utxos::Txid).string_len(64).not_null())
                    .col(ColumnDef::new(Utxos::N).integer().not_null())
                    .col(ColumnDef::new(Utxos::Address).string_len(128).not_null())
                    .col(ColumnDef::new(Utxos::Value).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(Utxos::BlockHeight).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Richlist and balance lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_utxos_address")
                    .table(Utxos::Table)
                    .col(Utxos::Address)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_utxos_txid")
                    .table(Utxos::Table)
                    .col(Utxos::Txid)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Utxos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    BlockHash,
    BlockHeight,
    CreatedAt,
    Version,
    Vin,
    Vout,
    IsReward,
}

#[derive(Iden)]
enum Utxos {
    Table,
    Id,
    Txid,
    N,
    Address,
    Value,
    BlockHeight,
}
