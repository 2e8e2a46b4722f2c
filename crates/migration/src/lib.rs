pub use sea_orm_migration::prelude::*;

mod m20260901_000001_debts;
mod m20260901_000002_balance_requests;
mod m20260901_000003_group_stats;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_debts::Migration),
            Box::new(m20260901_000002_balance_requests::Migration),
            Box::new(m20260901_000003_group_stats::Migration),
        ]
    }
}
