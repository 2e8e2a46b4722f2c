mod common;

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};

use common::{
    FailingStats, GROUP, RecordingStats, StatsCall, engine_with_db, engine_with_stats,
    open_between, owes, pay,
};
use engine::{Currency, DebtStatus, EngineError, ExpenseShare, Money, PostExpenseCmd, Transfer};

#[tokio::test]
async fn equal_split_creates_one_row_per_participant() {
    let (engine, _db) = engine_with_db().await;

    pay(&engine, "alice", &[("alice", 1000), ("bob", 1000), ("carol", 1000)]).await;

    assert_eq!(owes(&engine, "bob", "alice").await, 1000);
    assert_eq!(owes(&engine, "carol", "alice").await, 1000);
    assert_eq!(engine.group_balances(GROUP).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reverse_share_reduces_existing_row() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("alice", 1000), ("bob", 1000), ("carol", 1000)]).await;
    let before = open_between(&engine, "bob", "alice").await.unwrap();

    pay(&engine, "bob", &[("alice", 300), ("bob", 300)]).await;

    let after = open_between(&engine, "bob", "alice").await.unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.ower_id, "bob");
    assert_eq!(after.amount, Money::new(700));
    assert_eq!(owes(&engine, "carol", "alice").await, 1000);
}

#[tokio::test]
async fn exact_cancellation_closes_the_row() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("bob", 50)]).await;
    let row = open_between(&engine, "bob", "alice").await.unwrap();

    pay(&engine, "bob", &[("alice", 50)]).await;

    assert!(open_between(&engine, "alice", "bob").await.is_none());
    let closed = engine.debt(row.id).await.unwrap();
    assert_eq!(closed.status, DebtStatus::Completed);
}

#[tokio::test]
async fn larger_reverse_share_flips_direction() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("bob", 300)]).await;
    let old = open_between(&engine, "bob", "alice").await.unwrap();

    pay(&engine, "bob", &[("alice", 1000)]).await;

    let flipped = open_between(&engine, "alice", "bob").await.unwrap();
    assert_ne!(flipped.id, old.id);
    assert_eq!(flipped.ower_id, "alice");
    assert_eq!(flipped.owed_to_id, "bob");
    assert_eq!(flipped.amount, Money::new(700));
    assert_eq!(engine.debt(old.id).await.unwrap().status, DebtStatus::Completed);
}

#[tokio::test]
async fn open_row_tracks_the_algebraic_net() {
    let (engine, _db) = engine_with_db().await;
    let postings: [(&str, &str, i64); 6] = [
        ("alice", "bob", 400),
        ("bob", "alice", 150),
        ("bob", "alice", 900),
        ("alice", "bob", 650),
        ("alice", "bob", 10),
        ("bob", "alice", 10),
    ];
    let mut net = 0i64;
    for (payer, participant, amount) in postings {
        pay(&engine, payer, &[(participant, amount)]).await;
        net += if participant == "bob" { amount } else { -amount };
        assert_eq!(owes(&engine, "bob", "alice").await, net);
    }
}

#[tokio::test]
async fn payer_share_never_creates_a_self_debt() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("alice", 500)]).await;
    assert!(engine.group_balances(GROUP).await.unwrap().is_empty());
}

#[tokio::test]
async fn currencies_keep_separate_rows() {
    let (engine, _db) = engine_with_db().await;
    engine
        .post_expense(PostExpenseCmd::new(GROUP, Currency::Inr, "alice").share("bob", Money::new(100)))
        .await
        .unwrap();
    engine
        .post_expense(PostExpenseCmd::new(GROUP, Currency::Usd, "bob").share("alice", Money::new(100)))
        .await
        .unwrap();

    let rows = engine.group_balances(GROUP).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|d| d.currency == Currency::Inr && d.ower_id == "bob"));
    assert!(rows.iter().any(|d| d.currency == Currency::Usd && d.ower_id == "alice"));
}

#[tokio::test]
async fn invalid_expenses_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .post_expense(PostExpenseCmd::new(" ", Currency::Inr, "alice").share("bob", Money::new(1)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidInput("group id must not be empty".to_string())
    );

    let err = engine
        .post_expense(PostExpenseCmd::new(GROUP, Currency::Inr, "alice").share("bob", Money::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .post_expense(
            PostExpenseCmd::new(GROUP, Currency::Inr, "alice").shares([
                ExpenseShare::new("bob", Money::new(10)),
                ExpenseShare::new("bob", Money::new(20)),
            ]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .post_expense(PostExpenseCmd::new(GROUP, Currency::Inr, "alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    assert!(engine.group_balances(GROUP).await.unwrap().is_empty());
}

#[tokio::test]
async fn whole_total_is_reported_to_stats() {
    let stats = Arc::new(RecordingStats::default());
    let engine = engine_with_stats(stats.clone()).await;

    pay(&engine, "alice", &[("alice", 1000), ("bob", 1000), ("carol", 1000)]).await;

    assert_eq!(
        *stats.calls.lock().await,
        vec![StatsCall::Increase(GROUP.to_string(), Money::new(3000))]
    );
}

#[tokio::test]
async fn stored_stats_accumulate_spending() {
    let (engine, _db) = engine_with_db().await;
    engine
        .set_group_budget(GROUP, Money::new(10_000))
        .await
        .unwrap();

    pay(&engine, "alice", &[("alice", 1000), ("bob", 1000)]).await;
    pay(&engine, "bob", &[("alice", 500)]).await;

    let stats = engine.group_stats(GROUP).await.unwrap();
    assert_eq!(stats.budget, Money::new(10_000));
    assert_eq!(stats.spent, Money::new(2500));
    assert_eq!(stats.money_left(), Money::new(7500));
}

#[tokio::test]
async fn negative_budget_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .set_group_budget(GROUP, Money::new(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn failing_stats_never_roll_back_debts() {
    let engine = engine_with_stats(Arc::new(FailingStats)).await;

    pay(&engine, "alice", &[("bob", 1000)]).await;

    assert_eq!(owes(&engine, "bob", "alice").await, 1000);
}

#[tokio::test]
async fn concurrent_postings_between_one_pair_net_exactly() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20i64 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            let (payer, participant) = if i % 3 == 0 { ("bob", "alice") } else { ("alice", "bob") };
            engine
                .post_expense(
                    PostExpenseCmd::new(GROUP, Currency::Inr, payer)
                        .share(participant, Money::new(100 + i)),
                )
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let expected: i64 = (0..20i64)
        .map(|i| if i % 3 == 0 { -(100 + i) } else { 100 + i })
        .sum();
    assert_eq!(owes(&engine, "bob", "alice").await, expected);
}

#[tokio::test]
async fn storage_rejects_a_second_open_row_for_a_pair() {
    let (engine, db) = engine_with_db().await;
    pay(&engine, "alice", &[("bob", 100)]).await;

    let backend = db.get_database_backend();
    let err = db
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO debts (id, group_id, currency, ower_id, owed_to_id, amount_minor, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
            vec![
                uuid::Uuid::new_v4().to_string().into(),
                GROUP.into(),
                "INR".into(),
                "alice".into(),
                "bob".into(),
                5i64.into(),
                "disputed".into(),
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(EngineError::from(err), EngineError::Conflict(_)));
}

#[tokio::test]
async fn simplify_collapses_a_chain() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("bob", 500)]).await;
    pay(&engine, "bob", &[("carol", 500)]).await;

    let transfers = engine.simplify(GROUP).await.unwrap();

    assert_eq!(
        transfers,
        vec![Transfer {
            from: "carol".to_string(),
            to: "alice".to_string(),
            amount: Money::new(500),
            currency: Currency::Inr,
        }]
    );
    // The plan is advisory: stored debts are untouched.
    assert_eq!(engine.group_balances(GROUP).await.unwrap().len(), 2);
}

#[tokio::test]
async fn totals_beyond_i64_are_reported_not_wrapped() {
    let engine = engine_with_stats(Arc::new(RecordingStats::default())).await;
    let half = i64::MAX / 2 + 1;
    pay(&engine, "alice", &[("bob", half)]).await;
    pay(&engine, "alice", &[("carol", half)]).await;

    let err = engine.simplify(GROUP).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    let err = engine.user_summary("alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    // Each row on its own is still readable.
    assert_eq!(owes(&engine, "bob", "alice").await, half);
}

#[tokio::test]
async fn user_summary_totals_per_currency() {
    let (engine, _db) = engine_with_db().await;
    pay(&engine, "alice", &[("bob", 1000), ("carol", 400)]).await;
    pay(&engine, "dave", &[("alice", 250)]).await;
    engine
        .post_expense(PostExpenseCmd::new(GROUP, Currency::Usd, "bob").share("alice", Money::new(20)))
        .await
        .unwrap();

    let summary = engine.user_summary("alice").await.unwrap();

    assert_eq!(summary.owed.len(), 2);
    assert_eq!(summary.receivable.len(), 2);
    let inr = summary
        .totals
        .iter()
        .find(|t| t.currency == Currency::Inr)
        .unwrap();
    assert_eq!(inr.receivable, Money::new(1400));
    assert_eq!(inr.owed, Money::new(250));
    assert_eq!(inr.net(), Money::new(1150));
    let usd = summary
        .totals
        .iter()
        .find(|t| t.currency == Currency::Usd)
        .unwrap();
    assert_eq!(usd.owed, Money::new(20));
    assert_eq!(usd.receivable, Money::ZERO);
}

#[tokio::test]
async fn unknown_debt_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.debt(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
