use sea_orm_migration::prelude::*;

use crate::m20260901_000001_debts::Debts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum BalanceRequests {
    Table,
    Id,
    Kind,
    DebtId,
    GroupId,
    RequestedBy,
    TargetUserId,
    Status,
    Reason,
    ProposedAmountMinor,
    DisputedAmountMinor,
    CreatedAt,
    ResolvedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BalanceRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BalanceRequests::Kind).string().not_null())
                    .col(ColumnDef::new(BalanceRequests::DebtId).string().not_null())
                    .col(ColumnDef::new(BalanceRequests::GroupId).string().not_null())
                    .col(ColumnDef::new(BalanceRequests::RequestedBy).string().not_null())
                    .col(ColumnDef::new(BalanceRequests::TargetUserId).string().not_null())
                    .col(
                        ColumnDef::new(BalanceRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(BalanceRequests::Reason).string())
                    .col(ColumnDef::new(BalanceRequests::ProposedAmountMinor).big_integer())
                    .col(ColumnDef::new(BalanceRequests::DisputedAmountMinor).big_integer())
                    .col(ColumnDef::new(BalanceRequests::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(BalanceRequests::ResolvedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_requests-debt_id")
                            .from(BalanceRequests::Table, BalanceRequests::DebtId)
                            .to(Debts::Table, Debts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_requests-target_user_id-status")
                    .table(BalanceRequests::Table)
                    .col(BalanceRequests::TargetUserId)
                    .col(BalanceRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_requests-requested_by")
                    .table(BalanceRequests::Table)
                    .col(BalanceRequests::RequestedBy)
                    .to_owned(),
            )
            .await?;

        // One pending request of each kind per debt.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-balance_requests-pending-unique\" \
                 ON \"balance_requests\" (\"debt_id\", \"kind\") \
                 WHERE \"status\" = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BalanceRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
