use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{expenses, groups, requests, users};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// All routes of the API. The acting user travels in the request body.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", post(expenses::expense_new))
        .route("/groups/{group_id}/balances", get(groups::balances))
        .route("/groups/{group_id}/simplified", get(groups::simplified))
        .route(
            "/groups/{group_id}/stats",
            get(groups::stats).put(groups::set_budget),
        )
        .route("/users/{user_id}/summary", get(users::summary))
        .route("/requests/settle", post(requests::settlement_new))
        .route("/requests/dispute", post(requests::dispute_new))
        .route("/requests/{id}/accept", post(requests::accept))
        .route("/requests/{id}/reject", post(requests::reject))
        .route("/requests/pending/{user_id}", get(requests::pending))
        .route("/requests/activity/{user_id}", get(requests::activity))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
