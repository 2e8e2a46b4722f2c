use crate::{GroupStats, Money, ResultEngine, util::normalize_required_id};

use super::Engine;

impl Engine {
    /// Budget and spending of a group as recorded in `group_stats`.
    pub async fn group_stats(&self, group_id: &str) -> ResultEngine<GroupStats> {
        let group_id = normalize_required_id(group_id, "group")?;
        self.bounded(self.stored_stats.get(&group_id)).await
    }

    pub async fn set_group_budget(&self, group_id: &str, budget: Money) -> ResultEngine<GroupStats> {
        let group_id = normalize_required_id(group_id, "group")?;
        let stats = self
            .bounded(self.stored_stats.set_budget(&group_id, budget))
            .await?;
        tracing::info!(group_id = %group_id, budget = budget.minor(), "group budget updated");
        Ok(stats)
    }
}
