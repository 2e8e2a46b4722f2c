//! User API endpoints

use api_types::debt::UserSummaryView;
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, convert::summary_view, server::ServerState};

/// Open debts of a user across groups, totalled per currency
pub async fn summary(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserSummaryView>, ServerError> {
    let summary = state.engine.user_summary(&user_id).await?;
    Ok(Json(summary_view(&summary)))
}
