use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, Money, TransactionKind};
use migration::MigratorTrait;
use server::types::{BalanceView, TransactionView};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(Arc::new(engine))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_transaction(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transaction")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn credit_debit_and_reject_scenario() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_transaction(json!({"wallet_id": "w1", "amount": 100, "type": "credit"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx: TransactionView = serde_json::from_value(body).unwrap();
    assert_eq!(tx.id, 1);
    assert_eq!(tx.wallet_id, "w1");
    assert_eq!(tx.amount, Money::new(10_000));
    assert_eq!(tx.kind, TransactionKind::Credit);

    let (status, body) = send(
        &app,
        post_transaction(json!({"wallet_id": "w1", "amount": 40, "type": "debit"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);
    assert_eq!(body["type"], "debit");

    let (status, body) = send(
        &app,
        post_transaction(json!({"wallet_id": "w1", "amount": 1000, "type": "debit"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient balance");

    let (status, body) = send(&app, get("/api/balance/w1")).await;
    assert_eq!(status, StatusCode::OK);
    let balance: BalanceView = serde_json::from_value(body).unwrap();
    assert_eq!(
        balance,
        BalanceView {
            wallet_id: "w1".to_string(),
            balance: Money::new(6_000),
        }
    );

    let (status, body) = send(&app, get("/api/transactions/w1")).await;
    assert_eq!(status, StatusCode::OK);
    let txs: Vec<TransactionView> = serde_json::from_value(body).unwrap();
    let ids: Vec<i64> = txs.iter().map(|tx| tx.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn decimal_amounts_are_exact() {
    let app = app().await;

    for _ in 0..3 {
        let (status, _) = send(
            &app,
            post_transaction(json!({"wallet_id": "cents", "amount": 0.1, "type": "credit"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, get("/api/balance/cents")).await;
    let balance: BalanceView = serde_json::from_value(body).unwrap();
    assert_eq!(balance.balance, Money::new(30));
}

#[tokio::test]
async fn large_amounts_round_trip_to_the_cent() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/transaction")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"wallet_id": "whale", "amount": 90071992547409.93, "type": "credit"}"#,
        ))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount"].to_string(), "90071992547409.93");

    let (_, body) = send(&app, get("/api/balance/whale")).await;
    assert_eq!(body["balance"].to_string(), "90071992547409.93");
    let balance: BalanceView = serde_json::from_value(body).unwrap();
    assert_eq!(balance.balance, Money::new(9_007_199_254_740_993));
}

#[tokio::test]
async fn string_amount_is_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        post_transaction(json!({"wallet_id": "w1", "amount": "10,5", "type": "credit"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn validation_messages() {
    let app = app().await;

    let cases = [
        (
            json!({"wallet_id": "", "amount": 10, "type": "credit"}),
            "Wallet ID is required",
        ),
        (json!({"amount": 10, "type": "credit"}), "Wallet ID is required"),
        (
            json!({"wallet_id": "w1", "amount": 0, "type": "credit"}),
            "Amount must be positive",
        ),
        (
            json!({"wallet_id": "w1", "amount": -5, "type": "credit"}),
            "Amount must be positive",
        ),
        (
            json!({"wallet_id": "w1", "amount": 5, "type": "refund"}),
            "Transaction type must be 'credit' or 'debit'",
        ),
        (
            json!({"wallet_id": "w1", "amount": 1.005, "type": "credit"}),
            "Invalid request body",
        ),
    ];

    for (body, message) in cases {
        let (status, response) = send(&app, post_transaction(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], message);
    }

    let (status, _) = send(&app, get("/api/balance/w1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/transaction")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn unknown_wallet_reads() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/balance/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Wallet not found");

    let (status, body) = send(&app, get("/api/transactions/ghost")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn blank_wallet_id_in_path_is_bad_request() {
    let app = app().await;

    for uri in [
        "/api/balance/%20",
        "/api/balance/",
        "/api/transactions/%20",
        "/api/transactions/",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Wallet ID is required");
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
