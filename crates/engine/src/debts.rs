//! Pairwise debts.
//!
//! A [`Debt`] records that `ower_id` currently owes `owed_to_id` a net
//! `amount` in one currency within one group. While a row is open
//! (`pending` or `disputed`) it is the only open row for its unordered pair,
//! and its amount is always strictly positive.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Pending,
    Completed,
    Disputed,
}

impl DebtStatus {
    /// Statuses that take part in netting.
    pub const OPEN: [Self; 2] = [Self::Pending, Self::Disputed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
        }
    }

    /// Open rows take part in netting; completed rows are history.
    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "disputed" => Ok(Self::Disputed),
            other => Err(EngineError::InvalidInput(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub group_id: String,
    pub currency: Currency,
    pub ower_id: String,
    pub owed_to_id: String,
    pub amount: Money,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    /// A fresh pending row. The amount must be strictly positive.
    pub fn new(
        group_id: &str,
        currency: Currency,
        ower_id: &str,
        owed_to_id: &str,
        amount: Money,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "debt amount must be > 0".to_string(),
            ));
        }
        if ower_id == owed_to_id {
            return Err(EngineError::InvalidInput(
                "a user cannot owe themselves".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: group_id.to_string(),
            currency,
            ower_id: ower_id.to_string(),
            owed_to_id: owed_to_id.to_string(),
            amount,
            status: DebtStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns `true` if `user_id` is one of the two parties.
    pub fn involves(&self, user_id: &str) -> bool {
        self.ower_id == user_id || self.owed_to_id == user_id
    }

    /// The other party of the debt as seen from `user_id`.
    pub fn counterparty_of(&self, user_id: &str) -> ResultEngine<&str> {
        if self.ower_id == user_id {
            Ok(&self.owed_to_id)
        } else if self.owed_to_id == user_id {
            Ok(&self.ower_id)
        } else {
            Err(EngineError::Unauthorized(
                "user is not a party of this balance".to_string(),
            ))
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub currency: String,
    pub ower_id: String,
    pub owed_to_id: String,
    pub amount_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::balance_requests::Entity")]
    BalanceRequests,
}

impl Related<super::balance_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id.to_string()),
            group_id: ActiveValue::Set(debt.group_id.clone()),
            currency: ActiveValue::Set(debt.currency.code().to_string()),
            ower_id: ActiveValue::Set(debt.ower_id.clone()),
            owed_to_id: ActiveValue::Set(debt.owed_to_id.clone()),
            amount_minor: ActiveValue::Set(debt.amount.minor()),
            status: ActiveValue::Set(debt.status.as_str().to_string()),
            created_at: ActiveValue::Set(debt.created_at),
            updated_at: ActiveValue::Set(debt.updated_at),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "debt")?,
            group_id: model.group_id,
            currency: Currency::try_from(model.currency.as_str())?,
            ower_id: model.ower_id,
            owed_to_id: model.owed_to_id,
            amount: Money::new(model.amount_minor),
            status: DebtStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
