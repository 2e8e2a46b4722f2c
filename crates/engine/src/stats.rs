//! Group spend counters.
//!
//! The ledger only *notifies* the stats collaborator: it never reads the
//! counters back and a failing collaborator never rolls back a debt change.
//! [`StoredStats`] is the default implementation, keeping one `group_stats`
//! row per group. Counters are currency-agnostic sums of minor units.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseConnection,
    entity::prelude::*,
    sea_query::{Expr, OnConflict},
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Collaborator notified when group spending changes.
#[async_trait]
pub trait StatsAdjuster: Send + Sync {
    /// Adds a posted expense total to the group's spent counter.
    async fn increase_spent(&self, group_id: &str, amount: Money) -> ResultEngine<()>;

    /// Lowers the group's spent counter by `reduction` (an accepted dispute
    /// that decreased a debt). The counter never drops below zero.
    async fn adjust_spent(&self, group_id: &str, reduction: Money) -> ResultEngine<()>;
}

/// Budget and spending of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group_id: String,
    pub budget: Money,
    pub spent: Money,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GroupStats {
    /// Stats of a group nothing was recorded for yet.
    pub fn empty(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            budget: Money::ZERO,
            spent: Money::ZERO,
            updated_at: None,
        }
    }

    pub fn money_left(&self) -> Money {
        self.budget - self.spent
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "group_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: String,
    pub budget_minor: i64,
    pub spent_minor: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for GroupStats {
    fn from(model: Model) -> Self {
        Self {
            group_id: model.group_id,
            budget: Money::new(model.budget_minor),
            spent: Money::new(model.spent_minor),
            updated_at: Some(model.updated_at),
        }
    }
}

/// `group_stats`-backed [`StatsAdjuster`].
#[derive(Clone)]
pub struct StoredStats {
    database: DatabaseConnection,
}

impl fmt::Debug for StoredStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredStats").finish_non_exhaustive()
    }
}

impl StoredStats {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Current stats of the group (zeroes if none were recorded).
    pub async fn get(&self, group_id: &str) -> ResultEngine<GroupStats> {
        Ok(Entity::find_by_id(group_id.to_string())
            .one(&self.database)
            .await?
            .map(GroupStats::from)
            .unwrap_or_else(|| GroupStats::empty(group_id)))
    }

    /// Sets the budget of a group, creating its stats row when missing.
    pub async fn set_budget(&self, group_id: &str, budget: Money) -> ResultEngine<GroupStats> {
        if budget.is_negative() {
            return Err(EngineError::InvalidAmount(
                "budget must be >= 0".to_string(),
            ));
        }
        let on_conflict = OnConflict::column(Column::GroupId)
            .update_columns([Column::BudgetMinor, Column::UpdatedAt])
            .to_owned();
        self.upsert(group_id, budget, Money::ZERO, on_conflict)
            .await?;
        self.get(group_id).await
    }

    /// Inserts a fresh row or applies `on_conflict` to the existing one in a
    /// single statement, so concurrent adjustments never lose updates.
    async fn upsert(
        &self,
        group_id: &str,
        budget: Money,
        spent: Money,
        on_conflict: OnConflict,
    ) -> ResultEngine<()> {
        let active = ActiveModel {
            group_id: ActiveValue::Set(group_id.to_string()),
            budget_minor: ActiveValue::Set(budget.minor()),
            spent_minor: ActiveValue::Set(spent.minor()),
            updated_at: ActiveValue::Set(Utc::now()),
        };
        Entity::insert(active)
            .on_conflict(on_conflict)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StatsAdjuster for StoredStats {
    async fn increase_spent(&self, group_id: &str, amount: Money) -> ResultEngine<()> {
        let on_conflict = OnConflict::column(Column::GroupId)
            .value(
                Column::SpentMinor,
                Expr::col(Column::SpentMinor).add(amount.minor()),
            )
            .update_column(Column::UpdatedAt)
            .to_owned();
        self.upsert(group_id, Money::ZERO, amount, on_conflict)
            .await
    }

    async fn adjust_spent(&self, group_id: &str, reduction: Money) -> ResultEngine<()> {
        let on_conflict = OnConflict::column(Column::GroupId)
            .value(
                Column::SpentMinor,
                Expr::cust_with_values("MAX(\"spent_minor\" - ?, 0)", [reduction.minor()]),
            )
            .update_column(Column::UpdatedAt)
            .to_owned();
        self.upsert(group_id, Money::ZERO, Money::ZERO, on_conflict)
            .await
    }
}
