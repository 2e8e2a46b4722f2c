//! Group API endpoints

use api_types::{
    debt::{DebtList, TransferList},
    stats::{BudgetUpdate, GroupStatsView},
};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::Money;

use crate::{
    ServerError,
    convert::{debt_view, stats_view, transfer_view},
    server::ServerState,
};

/// Open debts of the group
pub async fn balances(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<DebtList>, ServerError> {
    let debts = state.engine.group_balances(&group_id).await?;
    Ok(Json(DebtList {
        debts: debts.iter().map(debt_view).collect(),
    }))
}

/// Suggested transfers settling the group
pub async fn simplified(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<TransferList>, ServerError> {
    let transfers = state.engine.simplify(&group_id).await?;
    Ok(Json(TransferList {
        transfers: transfers.iter().map(transfer_view).collect(),
    }))
}

pub async fn stats(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupStatsView>, ServerError> {
    let stats = state.engine.group_stats(&group_id).await?;
    Ok(Json(stats_view(&stats)))
}

pub async fn set_budget(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<GroupStatsView>, ServerError> {
    let stats = state
        .engine
        .set_group_budget(&group_id, Money::new(payload.budget_minor))
        .await?;
    Ok(Json(stats_view(&stats)))
}
