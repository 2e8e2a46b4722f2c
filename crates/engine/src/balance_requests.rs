//! Settlement and dispute requests.
//!
//! A [`BalanceRequest`] asks the counter-party of a debt to acknowledge
//! either that the debt was paid outside the ledger (`settlement`) or that
//! its amount should change (`dispute`). It is resolved exactly once by
//! `target_user_id` and is immutable afterwards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Settlement,
    Dispute,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settlement => "settlement",
            Self::Dispute => "dispute",
        }
    }
}

impl TryFrom<&str> for RequestKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "settlement" => Ok(Self::Settlement),
            "dispute" => Ok(Self::Dispute),
            other => Err(EngineError::InvalidInput(format!(
                "invalid request kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid request status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub id: Uuid,
    pub kind: RequestKind,
    pub debt_id: Uuid,
    pub group_id: String,
    pub requested_by: String,
    pub target_user_id: String,
    pub status: RequestStatus,
    /// Dispute-only.
    pub reason: Option<String>,
    /// Dispute-only.
    pub proposed_amount: Option<Money>,
    /// Dispute-only. Debt amount when the dispute was raised; acceptance
    /// applies `proposed_amount - disputed_amount` to the current amount.
    pub disputed_amount: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl BalanceRequest {
    pub(crate) fn settlement(
        debt_id: Uuid,
        group_id: &str,
        requested_by: &str,
        target_user_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: RequestKind::Settlement,
            debt_id,
            group_id: group_id.to_string(),
            requested_by: requested_by.to_string(),
            target_user_id: target_user_id.to_string(),
            status: RequestStatus::Pending,
            reason: None,
            proposed_amount: None,
            disputed_amount: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub(crate) fn dispute(
        debt_id: Uuid,
        group_id: &str,
        requested_by: &str,
        target_user_id: &str,
        reason: Option<String>,
        proposed_amount: Money,
        disputed_amount: Money,
    ) -> Self {
        Self {
            kind: RequestKind::Dispute,
            reason,
            proposed_amount: Some(proposed_amount),
            disputed_amount: Some(disputed_amount),
            ..Self::settlement(debt_id, group_id, requested_by, target_user_id)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "balance_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub debt_id: String,
    pub group_id: String,
    pub requested_by: String,
    pub target_user_id: String,
    pub status: String,
    pub reason: Option<String>,
    pub proposed_amount_minor: Option<i64>,
    pub disputed_amount_minor: Option<i64>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Debts,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BalanceRequest> for ActiveModel {
    fn from(request: &BalanceRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            kind: ActiveValue::Set(request.kind.as_str().to_string()),
            debt_id: ActiveValue::Set(request.debt_id.to_string()),
            group_id: ActiveValue::Set(request.group_id.clone()),
            requested_by: ActiveValue::Set(request.requested_by.clone()),
            target_user_id: ActiveValue::Set(request.target_user_id.clone()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            reason: ActiveValue::Set(request.reason.clone()),
            proposed_amount_minor: ActiveValue::Set(request.proposed_amount.map(Money::minor)),
            disputed_amount_minor: ActiveValue::Set(request.disputed_amount.map(Money::minor)),
            created_at: ActiveValue::Set(request.created_at),
            resolved_at: ActiveValue::Set(request.resolved_at),
        }
    }
}

impl TryFrom<Model> for BalanceRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "request")?,
            kind: RequestKind::try_from(model.kind.as_str())?,
            debt_id: parse_uuid(&model.debt_id, "debt")?,
            group_id: model.group_id,
            requested_by: model.requested_by,
            target_user_id: model.target_user_id,
            status: RequestStatus::try_from(model.status.as_str())?,
            reason: model.reason,
            proposed_amount: model.proposed_amount_minor.map(Money::new),
            disputed_amount: model.disputed_amount_minor.map(Money::new),
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}
