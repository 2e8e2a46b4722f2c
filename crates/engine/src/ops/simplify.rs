use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{Debt, DebtStatus, ResultEngine, Transfer, debts, simplify, util::normalize_required_id};

use super::Engine;

impl Engine {
    /// Suggested transfers settling the pending debts of a group.
    ///
    /// Reads a snapshot without taking pair locks; the plan is advisory and
    /// may be stale by the time it is shown.
    pub async fn simplify(&self, group_id: &str) -> ResultEngine<Vec<Transfer>> {
        let group_id = normalize_required_id(group_id, "group")?;
        let debts = self.bounded(self.pending_debts(&group_id)).await?;
        let transfers = simplify::plan(&debts)?;
        tracing::debug!(
            group_id = %group_id,
            debts = debts.len(),
            transfers = transfers.len(),
            "group simplified"
        );
        Ok(transfers)
    }

    async fn pending_debts(&self, group_id: &str) -> ResultEngine<Vec<Debt>> {
        debts::Entity::find()
            .filter(debts::Column::GroupId.eq(group_id))
            .filter(debts::Column::Status.eq(DebtStatus::Pending.as_str()))
            .order_by_asc(debts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Debt::try_from)
            .collect()
    }
}
