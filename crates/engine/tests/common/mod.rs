#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::Mutex;

use engine::{Currency, Debt, Engine, EngineError, Money, PostExpenseCmd, StatsAdjuster};
use migration::MigratorTrait;

pub const GROUP: &str = "trip";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_stats(stats: Arc<dyn StatsAdjuster>) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .stats(stats)
        .build()
        .await
        .unwrap()
}

/// `payer` pays and every `(user, amount)` share is posted in INR.
pub async fn pay(engine: &Engine, payer: &str, shares: &[(&str, i64)]) {
    let cmd = shares
        .iter()
        .fold(PostExpenseCmd::new(GROUP, Currency::Inr, payer), |cmd, (user, amount)| {
            cmd.share(*user, Money::new(*amount))
        });
    engine.post_expense(cmd).await.unwrap();
}

/// The open row between `a` and `b` in INR, in whichever direction.
pub async fn open_between(engine: &Engine, a: &str, b: &str) -> Option<Debt> {
    let rows: Vec<Debt> = engine
        .group_balances(GROUP)
        .await
        .unwrap()
        .into_iter()
        .filter(|d| d.currency == Currency::Inr && d.involves(a) && d.involves(b))
        .collect();
    assert!(rows.len() <= 1, "more than one open row between {a} and {b}");
    rows.into_iter().next()
}

/// Net position between two users: positive means `a` owes `b`.
pub async fn owes(engine: &Engine, a: &str, b: &str) -> i64 {
    match open_between(engine, a, b).await {
        Some(debt) if debt.ower_id == a => debt.amount.minor(),
        Some(debt) => -debt.amount.minor(),
        None => 0,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsCall {
    Increase(String, Money),
    Adjust(String, Money),
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingStats {
    pub calls: Mutex<Vec<StatsCall>>,
}

#[async_trait]
impl StatsAdjuster for RecordingStats {
    async fn increase_spent(&self, group_id: &str, amount: Money) -> Result<(), EngineError> {
        self.calls
            .lock()
            .await
            .push(StatsCall::Increase(group_id.to_string(), amount));
        Ok(())
    }

    async fn adjust_spent(&self, group_id: &str, reduction: Money) -> Result<(), EngineError> {
        self.calls
            .lock()
            .await
            .push(StatsCall::Adjust(group_id.to_string(), reduction));
        Ok(())
    }
}

/// Always fails, as an unreachable stats service would.
pub struct FailingStats;

#[async_trait]
impl StatsAdjuster for FailingStats {
    async fn increase_spent(&self, _group_id: &str, _amount: Money) -> Result<(), EngineError> {
        Err(EngineError::Unavailable("stats offline".to_string()))
    }

    async fn adjust_spent(&self, _group_id: &str, _reduction: Money) -> Result<(), EngineError> {
        Err(EngineError::Unavailable("stats offline".to_string()))
    }
}
