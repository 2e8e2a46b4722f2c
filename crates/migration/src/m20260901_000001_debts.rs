use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Debts {
    Table,
    Id,
    GroupId,
    Currency,
    OwerId,
    OwedToId,
    AmountMinor,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Debts::GroupId).string().not_null())
                    .col(ColumnDef::new(Debts::Currency).string().not_null())
                    .col(ColumnDef::new(Debts::OwerId).string().not_null())
                    .col(ColumnDef::new(Debts::OwedToId).string().not_null())
                    .col(ColumnDef::new(Debts::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Debts::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Debts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Debts::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-group_id-status")
                    .table(Debts::Table)
                    .col(Debts::GroupId)
                    .col(Debts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-ower_id")
                    .table(Debts::Table)
                    .col(Debts::OwerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-owed_to_id")
                    .table(Debts::Table)
                    .col(Debts::OwedToId)
                    .to_owned(),
            )
            .await?;

        // At most one open row per unordered pair. Expression and partial
        // indexes are not expressible through the index builder.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-debts-open-pair-unique\" \
                 ON \"debts\" (\"group_id\", \"currency\", \
                 MIN(\"ower_id\", \"owed_to_id\"), MAX(\"ower_id\", \"owed_to_id\")) \
                 WHERE \"status\" IN ('pending', 'disputed')",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        Ok(())
    }
}
