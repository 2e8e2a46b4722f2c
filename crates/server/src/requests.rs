//! Settlement and dispute API endpoints

use api_types::request::{
    BalanceRequestList, BalanceRequestView, DisputeNew, PendingRequestList, RequestAction,
    SettlementCreated, SettlementNew,
};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::{CreateDisputeCmd, CreateSettlementCmd, Money, SettlementOutcome};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{debt_view, payment_method_in, pending_view, request_view},
    server::ServerState,
};

/// Handle requests for settling a debt
pub async fn settlement_new(
    State(state): State<ServerState>,
    Json(payload): Json<SettlementNew>,
) -> Result<Json<SettlementCreated>, ServerError> {
    let method = payment_method_in(payload.payment_method.unwrap_or_default());
    let outcome = state
        .engine
        .create_settlement(
            CreateSettlementCmd::new(payload.debt_id, payload.user_id).payment_method(method),
        )
        .await?;
    Ok(Json(match outcome {
        SettlementOutcome::AutoCompleted(debt) => SettlementCreated::AutoCompleted {
            debt: debt_view(&debt),
        },
        SettlementOutcome::Requested(request) => SettlementCreated::Request {
            request: request_view(&request),
        },
    }))
}

/// Handle requests for disputing a debt amount
pub async fn dispute_new(
    State(state): State<ServerState>,
    Json(payload): Json<DisputeNew>,
) -> Result<Json<BalanceRequestView>, ServerError> {
    let mut cmd = CreateDisputeCmd::new(
        payload.debt_id,
        payload.user_id,
        Money::new(payload.proposed_amount_minor),
    );
    if let Some(reason) = payload.reason {
        cmd = cmd.reason(reason);
    }
    let request = state.engine.create_dispute(cmd).await?;
    Ok(Json(request_view(&request)))
}

pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestAction>,
) -> Result<Json<BalanceRequestView>, ServerError> {
    let request = state.engine.accept(id, &payload.user_id).await?;
    Ok(Json(request_view(&request)))
}

pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestAction>,
) -> Result<Json<BalanceRequestView>, ServerError> {
    let request = state.engine.reject(id, &payload.user_id).await?;
    Ok(Json(request_view(&request)))
}

/// Requests waiting on the user
pub async fn pending(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<PendingRequestList>, ServerError> {
    let pending = state.engine.list_pending_for(&user_id).await?;
    Ok(Json(PendingRequestList {
        requests: pending.iter().map(pending_view).collect(),
    }))
}

/// Latest requests the user made or received
pub async fn activity(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceRequestList>, ServerError> {
    let requests = state.engine.list_history_for(&user_id).await?;
    Ok(Json(BalanceRequestList {
        requests: requests.iter().map(request_view).collect(),
    }))
}
