use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, Debt, DebtStatus, EngineError, ExpenseShare, Money, PostExpenseCmd, ResultEngine,
    debts,
    locks::PairKey,
    netting::{self, Exposure, NettingPlan},
    util::normalize_required_id,
};

use super::{Engine, access::close, with_tx};

/// Open totals of a user in one currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTotals {
    pub currency: Currency,
    /// What the user owes others.
    pub owed: Money,
    /// What others owe the user.
    pub receivable: Money,
}

impl CurrencyTotals {
    pub fn net(&self) -> Money {
        self.receivable - self.owed
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    /// Open rows where the user is the ower.
    pub owed: Vec<Debt>,
    /// Open rows where the user is owed.
    pub receivable: Vec<Debt>,
    pub totals: Vec<CurrencyTotals>,
}

impl Engine {
    /// Posts an expense paid by `cmd.payer_id`, netting every other
    /// participant's share against the pair's open row.
    ///
    /// Each participant is applied in its own serialized unit of work. A
    /// failure stops the posting and is returned; participants already
    /// applied stay applied. The stats collaborator is notified with the
    /// whole expense total once every participant succeeded, and its failure
    /// is only logged.
    pub async fn post_expense(&self, cmd: PostExpenseCmd) -> ResultEngine<()> {
        let group_id = normalize_required_id(&cmd.group_id, "group")?;
        let payer_id = normalize_required_id(&cmd.payer_id, "payer")?;
        let shares = validate_shares(&payer_id, &cmd.shares)?;
        let total = cmd.total()?;

        let mut applied = 0usize;
        for share in shares.iter().filter(|s| s.user_id != payer_id) {
            let key = PairKey::new(&group_id, cmd.currency, &share.user_id, &payer_id);
            self.run_pair_unit(&key, || {
                self.apply_share(&group_id, cmd.currency, &payer_id, share)
            })
            .await?;
            applied += 1;
        }

        if total.is_positive()
            && let Err(err) = self.bounded(self.stats.increase_spent(&group_id, total)).await
        {
            tracing::warn!(group_id = %group_id, "failed to record group spending: {err}");
        }

        tracing::info!(
            group_id = %group_id,
            currency = %cmd.currency,
            participants = applied,
            total = total.minor(),
            "expense posted"
        );
        Ok(())
    }

    async fn apply_share(
        &self,
        group_id: &str,
        currency: Currency,
        payer_id: &str,
        share: &ExpenseShare,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let forward = self
                .find_open_debt(&db_tx, group_id, currency, &share.user_id, payer_id)
                .await?;
            let reverse = match forward {
                Some(_) => None,
                None => {
                    self.find_open_debt(&db_tx, group_id, currency, payer_id, &share.user_id)
                        .await?
                }
            };
            let exposure = match (&forward, &reverse) {
                (Some(debt), _) => Exposure::Forward(debt.amount),
                (None, Some(debt)) => Exposure::Reverse(debt.amount),
                (None, None) => Exposure::None,
            };

            let now = Utc::now();
            match (netting::plan(exposure, share.amount)?, forward, reverse) {
                (NettingPlan::Increase { amount }, Some(mut debt), _)
                | (NettingPlan::Reduce { amount }, None, Some(mut debt)) => {
                    debt.amount = amount;
                    debt.updated_at = now;
                    self.save_debt(&db_tx, &debt).await?;
                }
                (NettingPlan::Flip { amount }, None, Some(mut debt)) => {
                    close(&mut debt, now);
                    self.save_debt(&db_tx, &debt).await?;
                    let flipped = Debt::new(group_id, currency, &share.user_id, payer_id, amount)?;
                    self.insert_debt(&db_tx, &flipped).await?;
                }
                (NettingPlan::Close, None, Some(mut debt)) => {
                    close(&mut debt, now);
                    self.save_debt(&db_tx, &debt).await?;
                }
                (NettingPlan::Create { amount }, None, None) => {
                    let debt = Debt::new(group_id, currency, &share.user_id, payer_id, amount)?;
                    self.insert_debt(&db_tx, &debt).await?;
                }
                (plan, _, _) => {
                    return Err(EngineError::InvalidState(format!(
                        "netting plan {plan:?} does not match stored rows"
                    )));
                }
            }
            Ok(())
        })
    }

    /// Open debts of a group (pending and disputed), oldest first.
    pub async fn group_balances(&self, group_id: &str) -> ResultEngine<Vec<Debt>> {
        let group_id = normalize_required_id(group_id, "group")?;
        self.bounded(self.open_debts(Condition::all().add(debts::Column::GroupId.eq(group_id))))
            .await
    }

    /// A single debt row, in any status.
    pub async fn debt(&self, debt_id: Uuid) -> ResultEngine<Debt> {
        self.bounded(self.require_debt(&self.database, debt_id))
            .await
    }

    /// Open debts of a user across all groups, split by direction and
    /// totalled per currency.
    pub async fn user_summary(&self, user_id: &str) -> ResultEngine<UserSummary> {
        let user_id = normalize_required_id(user_id, "user")?;
        let either_side = Condition::any()
            .add(debts::Column::OwerId.eq(user_id.as_str()))
            .add(debts::Column::OwedToId.eq(user_id.as_str()));
        let rows = self.bounded(self.open_debts(either_side)).await?;

        let mut totals: BTreeMap<Currency, CurrencyTotals> = BTreeMap::new();
        let (owed, receivable): (Vec<Debt>, Vec<Debt>) =
            rows.into_iter().partition(|d| d.ower_id == user_id);
        for debt in &owed {
            let entry = totals_for(&mut totals, debt.currency);
            entry.owed = entry.owed.try_add(debt.amount)?;
        }
        for debt in &receivable {
            let entry = totals_for(&mut totals, debt.currency);
            entry.receivable = entry.receivable.try_add(debt.amount)?;
        }

        Ok(UserSummary {
            user_id,
            owed,
            receivable,
            totals: totals.into_values().collect(),
        })
    }

    async fn open_debts(&self, condition: Condition) -> ResultEngine<Vec<Debt>> {
        debts::Entity::find()
            .filter(condition)
            .filter(debts::Column::Status.is_in(DebtStatus::OPEN.map(DebtStatus::as_str)))
            .order_by_asc(debts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Debt::try_from)
            .collect()
    }
}

fn totals_for(totals: &mut BTreeMap<Currency, CurrencyTotals>, currency: Currency) -> &mut CurrencyTotals {
    totals.entry(currency).or_insert_with(|| CurrencyTotals {
        currency,
        owed: Money::ZERO,
        receivable: Money::ZERO,
    })
}

/// Trims participant ids and checks amounts. Every participant other than
/// the payer must carry a positive share; the payer's own share may be zero.
fn validate_shares(payer_id: &str, shares: &[ExpenseShare]) -> ResultEngine<Vec<ExpenseShare>> {
    if shares.is_empty() {
        return Err(EngineError::InvalidInput(
            "expense has no participants".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(shares.len());
    for share in shares {
        let user_id = normalize_required_id(&share.user_id, "participant")?;
        if !seen.insert(user_id.clone()) {
            return Err(EngineError::InvalidInput(format!(
                "duplicate participant: {user_id}"
            )));
        }
        if share.amount.is_negative() || (user_id != payer_id && share.amount.is_zero()) {
            return Err(EngineError::InvalidAmount(format!(
                "share of {user_id} must be > 0"
            )));
        }
        normalized.push(ExpenseShare::new(user_id, share.amount));
    }
    Ok(normalized)
}
