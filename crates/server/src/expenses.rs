//! Expense API endpoints

use api_types::expense::ExpenseNew;
use axum::{Json, extract::State, http::StatusCode};
use engine::{ExpenseShare, Money, PostExpenseCmd};

use crate::{ServerError, convert::currency_in, server::ServerState};

/// Handle requests for posting a new expense
pub async fn expense_new(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<StatusCode, ServerError> {
    let currency = currency_in(payload.currency.unwrap_or_default());
    let cmd = PostExpenseCmd::new(payload.group_id, currency, payload.payer_id).shares(
        payload
            .shares
            .into_iter()
            .map(|share| ExpenseShare::new(share.user_id, Money::new(share.amount_minor))),
    );
    state.engine.post_expense(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}
