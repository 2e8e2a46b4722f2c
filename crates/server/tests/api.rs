use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_expense(app: &Router, payer: &str, shares: Value) {
    let (status, _) = call(
        app,
        Method::POST,
        "/expenses",
        Some(json!({
            "group_id": "trip",
            "currency": "INR",
            "payer_id": payer,
            "shares": shares,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn expense_shows_up_in_balances_and_stats() {
    let app = app().await;
    post_expense(
        &app,
        "alice",
        json!([
            {"user_id": "alice", "amount_minor": 1000},
            {"user_id": "bob", "amount_minor": 1000},
            {"user_id": "carol", "amount_minor": 1000},
        ]),
    )
    .await;

    let (status, body) = call(&app, Method::GET, "/groups/trip/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    let debts = body["debts"].as_array().unwrap();
    assert_eq!(debts.len(), 2);
    assert!(debts.iter().all(|d| d["owed_to_id"] == "alice"));
    assert!(debts.iter().all(|d| d["amount_minor"] == 1000));
    assert!(debts.iter().all(|d| d["status"] == "pending"));

    let (status, body) = call(&app, Method::GET, "/groups/trip/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spent_minor"], 3000);
}

#[tokio::test]
async fn budget_update_returns_money_left() {
    let app = app().await;
    let (status, body) = call(
        &app,
        Method::PUT,
        "/groups/trip/stats",
        Some(json!({"budget_minor": 5000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["money_left_minor"], 5000);

    let (status, body) = call(
        &app,
        Method::PUT,
        "/groups/trip/stats",
        Some(json!({"budget_minor": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("budget"));
}

#[tokio::test]
async fn simplified_plan_is_served() {
    let app = app().await;
    post_expense(&app, "alice", json!([{"user_id": "bob", "amount_minor": 500}])).await;
    post_expense(&app, "bob", json!([{"user_id": "carol", "amount_minor": 500}])).await;

    let (status, body) = call(&app, Method::GET, "/groups/trip/simplified", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["transfers"],
        json!([{"from": "carol", "to": "alice", "amount_minor": 500, "currency": "INR"}])
    );
}

#[tokio::test]
async fn settlement_handshake_over_http() {
    let app = app().await;
    post_expense(&app, "alice", json!([{"user_id": "bob", "amount_minor": 700}])).await;
    let (_, body) = call(&app, Method::GET, "/groups/trip/balances", None).await;
    let debt_id = body["debts"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/requests/settle",
        Some(json!({"debt_id": debt_id, "user_id": "bob", "payment_method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "request");
    let request_id = body["request"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, "/requests/pending/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"][0]["debt_amount_minor"], 700);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/requests/{request_id}/accept"),
        Some(json!({"user_id": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/requests/{request_id}/accept"),
        Some(json!({"user_id": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/requests/{request_id}/reject"),
        Some(json!({"user_id": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, Method::GET, "/groups/trip/balances", None).await;
    assert!(body["debts"].as_array().unwrap().is_empty());

    let (_, body) = call(&app, Method::GET, "/requests/activity/bob", None).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upi_settles_instantly() {
    let app = app().await;
    post_expense(&app, "alice", json!([{"user_id": "bob", "amount_minor": 700}])).await;
    let (_, body) = call(&app, Method::GET, "/groups/trip/balances", None).await;
    let debt_id = body["debts"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/requests/settle",
        Some(json!({"debt_id": debt_id, "user_id": "bob", "payment_method": "upi"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "auto_completed");
    assert_eq!(body["debt"]["status"], "completed");

    let (status, _) = call(
        &app,
        Method::POST,
        "/requests/settle",
        Some(json!({"debt_id": debt_id, "user_id": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn dispute_and_summary_over_http() {
    let app = app().await;
    post_expense(&app, "alice", json!([{"user_id": "bob", "amount_minor": 1000}])).await;
    let (_, body) = call(&app, Method::GET, "/groups/trip/balances", None).await;
    let debt_id = body["debts"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/requests/dispute",
        Some(json!({
            "debt_id": debt_id,
            "user_id": "bob",
            "reason": "skipped dessert",
            "proposed_amount_minor": 800,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "dispute");
    assert_eq!(body["target_user_id"], "alice");
    let request_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/requests/{request_id}/accept"),
        Some(json!({"user_id": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/users/bob/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owed"][0]["amount_minor"], 800);
    assert_eq!(body["totals"][0]["currency"], "INR");
    assert_eq!(body["totals"][0]["net_minor"], -800);
}

#[tokio::test]
async fn engine_errors_become_json_errors() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({
            "group_id": "trip",
            "payer_id": "alice",
            "shares": [{"user_id": "bob", "amount_minor": 0}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/requests/{}/accept", uuid::Uuid::new_v4()),
        Some(json!({"user_id": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
