use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BalanceRequest, CreateDisputeCmd, CreateSettlementCmd, Currency, Debt, DebtStatus,
    EngineError, Money, RequestKind, RequestStatus, ResultEngine, balance_requests, debts,
    locks::PairKey,
    netting::{self, Exposure, NettingPlan},
    util::{normalize_optional_text, normalize_required_id},
};

use super::{Engine, access::close, with_tx};

const HISTORY_LIMIT: u64 = 50;

/// Result of [`Engine::create_settlement`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// The trusted instant rail closed the debt without a request.
    AutoCompleted(Debt),
    /// A request now waits for the counter-party.
    Requested(BalanceRequest),
}

/// A pending request together with the debt it refers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub request: BalanceRequest,
    pub debt_amount: Money,
    pub currency: Currency,
}

impl Engine {
    /// Asks the counter-party to confirm that the debt was paid.
    ///
    /// A trusted instant payment closes the debt immediately instead: the
    /// client's report of success is taken at face value.
    pub async fn create_settlement(
        &self,
        cmd: CreateSettlementCmd,
    ) -> ResultEngine<SettlementOutcome> {
        let requested_by = normalize_required_id(&cmd.requested_by, "user")?;
        let key = self.pair_key_of_debt(cmd.debt_id).await?;
        let outcome = self
            .run_pair_unit(&key, || {
                self.settlement_unit(cmd.debt_id, &requested_by, cmd.payment_method.is_trusted_instant())
            })
            .await?;
        match &outcome {
            SettlementOutcome::AutoCompleted(debt) => tracing::info!(
                debt_id = %debt.id,
                method = cmd.payment_method.as_str(),
                "balance settled instantly"
            ),
            SettlementOutcome::Requested(request) => tracing::info!(
                request_id = %request.id,
                debt_id = %request.debt_id,
                "settlement requested"
            ),
        }
        Ok(outcome)
    }

    async fn settlement_unit(
        &self,
        debt_id: Uuid,
        requested_by: &str,
        trusted_instant: bool,
    ) -> ResultEngine<SettlementOutcome> {
        with_tx!(self, |db_tx| {
            let mut debt = self.require_debt(&db_tx, debt_id).await?;
            if debt.status != DebtStatus::Pending {
                return Err(EngineError::InvalidState(
                    "balance already settled or disputed".to_string(),
                ));
            }
            let target = debt.counterparty_of(requested_by)?.to_string();

            if trusted_instant {
                close(&mut debt, Utc::now());
                self.save_debt(&db_tx, &debt).await?;
                Ok(SettlementOutcome::AutoCompleted(debt))
            } else {
                if self
                    .pending_request_exists(&db_tx, debt_id, RequestKind::Settlement)
                    .await?
                {
                    return Err(EngineError::Conflict(
                        "settlement request already pending".to_string(),
                    ));
                }
                let request =
                    BalanceRequest::settlement(debt_id, &debt.group_id, requested_by, &target);
                balance_requests::ActiveModel::from(&request)
                    .insert(&db_tx)
                    .await?;
                Ok(SettlementOutcome::Requested(request))
            }
        })
    }

    /// Proposes a new amount for a debt. A pending dispute on the same debt
    /// is replaced.
    pub async fn create_dispute(&self, cmd: CreateDisputeCmd) -> ResultEngine<BalanceRequest> {
        let requested_by = normalize_required_id(&cmd.requested_by, "user")?;
        if cmd.proposed_amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "proposed amount must be >= 0".to_string(),
            ));
        }
        let reason = normalize_optional_text(cmd.reason.as_deref());
        let key = self.pair_key_of_debt(cmd.debt_id).await?;
        let request = self
            .run_pair_unit(&key, || {
                self.dispute_unit(cmd.debt_id, &requested_by, reason.clone(), cmd.proposed_amount)
            })
            .await?;
        tracing::info!(
            request_id = %request.id,
            debt_id = %request.debt_id,
            proposed = cmd.proposed_amount.minor(),
            "dispute opened"
        );
        Ok(request)
    }

    async fn dispute_unit(
        &self,
        debt_id: Uuid,
        requested_by: &str,
        reason: Option<String>,
        proposed_amount: Money,
    ) -> ResultEngine<BalanceRequest> {
        with_tx!(self, |db_tx| {
            let mut debt = self.require_debt(&db_tx, debt_id).await?;
            if !debt.status.is_open() {
                return Err(EngineError::InvalidState(
                    "cannot dispute a settled balance".to_string(),
                ));
            }
            let target = debt.counterparty_of(requested_by)?.to_string();

            balance_requests::Entity::delete_many()
                .filter(balance_requests::Column::DebtId.eq(debt_id.to_string()))
                .filter(balance_requests::Column::Kind.eq(RequestKind::Dispute.as_str()))
                .filter(balance_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;

            let request = BalanceRequest::dispute(
                debt_id,
                &debt.group_id,
                requested_by,
                &target,
                reason,
                proposed_amount,
                debt.amount,
            );
            balance_requests::ActiveModel::from(&request)
                .insert(&db_tx)
                .await?;

            if debt.status != DebtStatus::Disputed {
                debt.status = DebtStatus::Disputed;
                debt.updated_at = request.created_at;
                self.save_debt(&db_tx, &debt).await?;
            }
            Ok(request)
        })
    }

    /// Accepts a pending request. Only its target may resolve it.
    pub async fn accept(&self, request_id: Uuid, by_user_id: &str) -> ResultEngine<BalanceRequest> {
        let by_user_id = normalize_required_id(by_user_id, "user")?;
        let key = self.pair_key_of_request(request_id).await?;
        let (request, reduction) = self
            .run_pair_unit(&key, || self.accept_unit(request_id, &by_user_id))
            .await?;

        if let Some(reduction) = reduction
            && let Err(err) = self
                .bounded(self.stats.adjust_spent(&request.group_id, reduction))
                .await
        {
            tracing::warn!(
                group_id = %request.group_id,
                "failed to lower group spending: {err}"
            );
        }
        tracing::info!(
            request_id = %request.id,
            kind = request.kind.as_str(),
            "request accepted"
        );
        Ok(request)
    }

    /// Returns the resolved request and, for a dispute that lowered the
    /// debt, the amount to take off the group's spending.
    async fn accept_unit(
        &self,
        request_id: Uuid,
        by_user_id: &str,
    ) -> ResultEngine<(BalanceRequest, Option<Money>)> {
        with_tx!(self, |db_tx| {
            let mut request = self.require_pending_target(&db_tx, request_id, by_user_id).await?;
            let mut debt = self.require_debt(&db_tx, request.debt_id).await?;
            let now = Utc::now();
            let mut reduction = None;

            match request.kind {
                RequestKind::Settlement => {
                    if debt.status.is_open() {
                        close(&mut debt, now);
                        self.save_debt(&db_tx, &debt).await?;
                    }
                }
                RequestKind::Dispute => {
                    if !debt.status.is_open() {
                        return Err(EngineError::InvalidState(
                            "balance was settled meanwhile".to_string(),
                        ));
                    }
                    let (proposed, disputed) = request
                        .proposed_amount
                        .zip(request.disputed_amount)
                        .ok_or_else(|| {
                            EngineError::InvalidState("dispute has no proposed amount".to_string())
                        })?;
                    // Expenses netted into the row since the dispute was raised stay applied.
                    let delta = proposed.try_sub(disputed)?;
                    if delta.is_negative() {
                        reduction = Some(Money::ZERO.try_sub(delta)?);
                    }
                    self.amend_debt(&db_tx, debt, delta, now).await?;
                }
            }

            request.status = RequestStatus::Accepted;
            request.resolved_at = Some(now);
            self.resolve_request(&db_tx, &request).await?;
            Ok((request, reduction))
        })
    }

    /// Rejects a pending request. A disputed debt returns to `pending`
    /// with its amount unchanged.
    pub async fn reject(&self, request_id: Uuid, by_user_id: &str) -> ResultEngine<BalanceRequest> {
        let by_user_id = normalize_required_id(by_user_id, "user")?;
        let key = self.pair_key_of_request(request_id).await?;
        let request = self
            .run_pair_unit(&key, || self.reject_unit(request_id, &by_user_id))
            .await?;
        tracing::info!(
            request_id = %request.id,
            kind = request.kind.as_str(),
            "request rejected"
        );
        Ok(request)
    }

    async fn reject_unit(&self, request_id: Uuid, by_user_id: &str) -> ResultEngine<BalanceRequest> {
        with_tx!(self, |db_tx| {
            let mut request = self.require_pending_target(&db_tx, request_id, by_user_id).await?;
            let now = Utc::now();
            if request.kind == RequestKind::Dispute {
                let mut debt = self.require_debt(&db_tx, request.debt_id).await?;
                if debt.status == DebtStatus::Disputed {
                    debt.status = DebtStatus::Pending;
                    debt.updated_at = now;
                    self.save_debt(&db_tx, &debt).await?;
                }
            }
            request.status = RequestStatus::Rejected;
            request.resolved_at = Some(now);
            self.resolve_request(&db_tx, &request).await?;
            Ok(request)
        })
    }

    /// Pending requests waiting on `user_id`, newest first.
    pub async fn list_pending_for(&self, user_id: &str) -> ResultEngine<Vec<PendingRequest>> {
        let user_id = normalize_required_id(user_id, "user")?;
        self.bounded(self.pending_requests(&user_id)).await
    }

    async fn pending_requests(&self, user_id: &str) -> ResultEngine<Vec<PendingRequest>> {
        let rows = balance_requests::Entity::find()
            .filter(balance_requests::Column::TargetUserId.eq(user_id))
            .filter(balance_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .order_by_desc(balance_requests::Column::CreatedAt)
            .find_also_related(debts::Entity)
            .all(&self.database)
            .await?;
        rows.into_iter()
            .map(|(request, debt)| {
                let debt = debt
                    .ok_or_else(|| EngineError::KeyNotFound("balance not exists".to_string()))?;
                let debt = Debt::try_from(debt)?;
                Ok(PendingRequest {
                    request: BalanceRequest::try_from(request)?,
                    debt_amount: debt.amount,
                    currency: debt.currency,
                })
            })
            .collect()
    }

    /// The latest requests `user_id` made or received, newest first.
    pub async fn list_history_for(&self, user_id: &str) -> ResultEngine<Vec<BalanceRequest>> {
        let user_id = normalize_required_id(user_id, "user")?;
        self.bounded(self.request_history(&user_id)).await
    }

    async fn request_history(&self, user_id: &str) -> ResultEngine<Vec<BalanceRequest>> {
        balance_requests::Entity::find()
            .filter(
                Condition::any()
                    .add(balance_requests::Column::RequestedBy.eq(user_id))
                    .add(balance_requests::Column::TargetUserId.eq(user_id)),
            )
            .order_by_desc(balance_requests::Column::CreatedAt)
            .limit(HISTORY_LIMIT)
            .all(&self.database)
            .await?
            .into_iter()
            .map(BalanceRequest::try_from)
            .collect()
    }

    /// Moves an accepted dispute's debt by `delta` (positive raises what the
    /// ower owes) and puts it back to `pending`. Crossing zero closes the row
    /// and, past zero, opens one in the other direction.
    async fn amend_debt<C: ConnectionTrait>(
        &self,
        db: &C,
        mut debt: Debt,
        delta: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        debt.status = DebtStatus::Pending;
        debt.updated_at = now;
        let plan = if delta.is_positive() {
            netting::plan(Exposure::Forward(debt.amount), delta)?
        } else if delta.is_negative() {
            // The owed-to side "pays" the reduction back to the ower.
            netting::plan(Exposure::Reverse(debt.amount), Money::ZERO.try_sub(delta)?)?
        } else {
            return self.save_debt(db, &debt).await;
        };

        match plan {
            NettingPlan::Increase { amount } | NettingPlan::Reduce { amount } => {
                debt.amount = amount;
                self.save_debt(db, &debt).await
            }
            NettingPlan::Close => {
                close(&mut debt, now);
                self.save_debt(db, &debt).await
            }
            NettingPlan::Flip { amount } => {
                close(&mut debt, now);
                self.save_debt(db, &debt).await?;
                let flipped = Debt::new(
                    &debt.group_id,
                    debt.currency,
                    &debt.owed_to_id,
                    &debt.ower_id,
                    amount,
                )?;
                self.insert_debt(db, &flipped).await
            }
            NettingPlan::Create { .. } => Err(EngineError::InvalidState(
                "amended balance has no open row".to_string(),
            )),
        }
    }

    async fn require_pending_target<C: ConnectionTrait>(
        &self,
        db: &C,
        request_id: Uuid,
        by_user_id: &str,
    ) -> ResultEngine<BalanceRequest> {
        let request = self.require_request(db, request_id).await?;
        if request.target_user_id != by_user_id {
            return Err(EngineError::Unauthorized(
                "only the counter-party can resolve this request".to_string(),
            ));
        }
        if !request.is_pending() {
            return Err(EngineError::InvalidState(
                "request already resolved".to_string(),
            ));
        }
        Ok(request)
    }

    /// The lock key of a debt. A debt's pair never changes, so it can be
    /// read before the lock is held.
    async fn pair_key_of_debt(&self, debt_id: Uuid) -> ResultEngine<PairKey> {
        let debt = self.debt(debt_id).await?;
        Ok(PairKey::new(
            &debt.group_id,
            debt.currency,
            &debt.ower_id,
            &debt.owed_to_id,
        ))
    }

    async fn pair_key_of_request(&self, request_id: Uuid) -> ResultEngine<PairKey> {
        let request = self
            .bounded(self.require_request(&self.database, request_id))
            .await?;
        self.pair_key_of_debt(request.debt_id).await
    }
}
