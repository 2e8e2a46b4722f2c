use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceRequest, Currency, Debt, DebtStatus, EngineError, RequestKind, RequestStatus,
    ResultEngine, balance_requests, debts,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_debt<C: ConnectionTrait>(
        &self,
        db: &C,
        debt_id: Uuid,
    ) -> ResultEngine<Debt> {
        let model = debts::Entity::find_by_id(debt_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("balance not exists".to_string()))?;
        Debt::try_from(model)
    }

    pub(super) async fn require_request<C: ConnectionTrait>(
        &self,
        db: &C,
        request_id: Uuid,
    ) -> ResultEngine<BalanceRequest> {
        let model = balance_requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("request not exists".to_string()))?;
        BalanceRequest::try_from(model)
    }

    /// The open row in which `ower_id` owes `owed_to_id`, if any.
    pub(super) async fn find_open_debt<C: ConnectionTrait>(
        &self,
        db: &C,
        group_id: &str,
        currency: Currency,
        ower_id: &str,
        owed_to_id: &str,
    ) -> ResultEngine<Option<Debt>> {
        debts::Entity::find()
            .filter(debts::Column::GroupId.eq(group_id))
            .filter(debts::Column::Currency.eq(currency.code()))
            .filter(debts::Column::OwerId.eq(ower_id))
            .filter(debts::Column::OwedToId.eq(owed_to_id))
            .filter(debts::Column::Status.is_in(DebtStatus::OPEN.map(DebtStatus::as_str)))
            .one(db)
            .await?
            .map(Debt::try_from)
            .transpose()
    }

    /// Persists the mutable columns of a debt.
    pub(super) async fn save_debt<C: ConnectionTrait>(&self, db: &C, debt: &Debt) -> ResultEngine<()> {
        debts::ActiveModel {
            id: ActiveValue::Unchanged(debt.id.to_string()),
            amount_minor: ActiveValue::Set(debt.amount.minor()),
            status: ActiveValue::Set(debt.status.as_str().to_string()),
            updated_at: ActiveValue::Set(debt.updated_at),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }

    pub(super) async fn insert_debt<C: ConnectionTrait>(&self, db: &C, debt: &Debt) -> ResultEngine<()> {
        debts::ActiveModel::from(debt).insert(db).await?;
        Ok(())
    }

    /// Marks a request resolved. Requests are immutable afterwards.
    pub(super) async fn resolve_request<C: ConnectionTrait>(
        &self,
        db: &C,
        request: &BalanceRequest,
    ) -> ResultEngine<()> {
        balance_requests::ActiveModel {
            id: ActiveValue::Unchanged(request.id.to_string()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            resolved_at: ActiveValue::Set(request.resolved_at),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }

    pub(super) async fn pending_request_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        debt_id: Uuid,
        kind: RequestKind,
    ) -> ResultEngine<bool> {
        let found = balance_requests::Entity::find()
            .filter(balance_requests::Column::DebtId.eq(debt_id.to_string()))
            .filter(balance_requests::Column::Kind.eq(kind.as_str()))
            .filter(balance_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .one(db)
            .await?;
        Ok(found.is_some())
    }
}

/// Closes an open row in memory. The row keeps its last amount as history.
pub(super) fn close(debt: &mut Debt, now: chrono::DateTime<chrono::Utc>) {
    debt.status = DebtStatus::Completed;
    debt.updated_at = now;
}
