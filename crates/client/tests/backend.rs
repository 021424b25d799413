use api_types::{Shillings, payment::PaymentUpdate, stk::StkPush};
use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
};
use collect_client::{Client, ClientError};
use engine::ReceiptOptions;
use serde_json::{Value, json};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn get_plots(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some("tok") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing token"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"plots": [{
            "id": "p1",
            "name": "Hunters Ridge",
            "plotType": "individual",
            "feePerTenant": "250",
            "tenants": [{"id": "t1", "name": "Alice", "phone": "254711111111", "amount": 250}]
        }]})),
    )
}

async fn get_payment(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "forbidden" => (StatusCode::FORBIDDEN, Json(json!({}))),
        "missing" => (StatusCode::NOT_FOUND, Json(json!({"error": "no such payment"}))),
        "dup" => (StatusCode::CONFLICT, Json(json!({"error": "duplicate"}))),
        "bad" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "bad phone"})),
        ),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        _ => (
            StatusCode::OK,
            Json(json!({"payment": {"id": id, "amount": {"cash": 500}}})),
        ),
    }
}

async fn update_payment(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body.get("amount").is_some() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "unexpected amount"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Payment updated"})),
    )
}

async fn delete_payment() -> Json<Value> {
    Json(json!({"success": false, "message": "Payment is locked"}))
}

async fn list_payments() -> Json<Value> {
    Json(json!({"success": false, "message": "database unavailable"}))
}

async fn stk(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body == json!({"phone": "254712345678", "amount": 100}) {
        (
            StatusCode::OK,
            Json(json!({"success": true, "message": "STK push sent"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid phone"})),
        )
    }
}

async fn router() -> String {
    spawn(
        Router::new()
            .route("/api/plots/getplots", get(get_plots))
            .route("/api/plots/{id}", delete(|| async { StatusCode::OK }))
            .route("/api/payments", get(list_payments))
            .route(
                "/api/payments/{id}",
                get(get_payment).put(update_payment).delete(delete_payment),
            )
            .route("/api/stk", post(stk)),
    )
    .await
}

#[tokio::test]
async fn plots_require_bearer_token() {
    let client = Client::new(&router().await).unwrap();

    let plots = client.plots("tok").await.unwrap();
    assert_eq!(plots.len(), 1);
    assert_eq!(plots[0].fee_per_tenant, Some(Shillings::new(250)));
    assert_eq!(plots[0].tenants[0].fee, Some(Shillings::new(250)));

    assert!(matches!(
        client.plots("wrong").await,
        Err(ClientError::Unauthorized)
    ));
}

#[tokio::test]
async fn status_codes_map_to_error_variants() {
    let client = Client::new(&router().await).unwrap();

    assert!(matches!(
        client.payment("tok", "forbidden").await,
        Err(ClientError::Forbidden)
    ));
    assert!(matches!(
        client.payment("tok", "missing").await,
        Err(ClientError::NotFound)
    ));
    match client.payment("tok", "dup").await {
        Err(ClientError::Conflict(message)) => assert_eq!(message, "duplicate"),
        other => panic!("expected conflict, got {other:?}"),
    }
    match client.payment("tok", "bad").await {
        Err(ClientError::Validation(message)) => assert_eq!(message, "bad phone"),
        other => panic!("expected validation, got {other:?}"),
    }
    match client.payment("tok", "boom").await {
        Err(ClientError::Server(message)) => assert_eq!(message, "unknown error"),
        other => panic!("expected server error, got {other:?}"),
    }

    let payment = client.payment("tok", "x1").await.unwrap();
    assert_eq!(payment.amount.cash, Some(Shillings::new(500)));
}

#[tokio::test]
async fn receipts_are_built_from_the_fetched_payment() {
    let client = Client::new(&router().await).unwrap();

    let receipt = client
        .receipt("tok", "QJ7K2", &ReceiptOptions::default())
        .await
        .unwrap();
    assert_eq!(receipt.payment_id, "QJ7K2");
    assert!(
        receipt
            .values()
            .iter()
            .any(|value| value.starts_with("Cash:") && value.ends_with("KES 500"))
    );
    assert!(matches!(
        client.receipt("tok", "missing", &ReceiptOptions::default()).await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn success_false_is_a_failure() {
    let client = Client::new(&router().await).unwrap();

    match client.delete_payment("tok", "x1").await {
        Err(ClientError::Rejected(message)) => assert_eq!(message, "Payment is locked"),
        other => panic!("expected rejection, got {other:?}"),
    }
    match client.payments("tok").await {
        Err(ClientError::Rejected(message)) => assert_eq!(message, "database unavailable"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn write_bodies_match_the_backend_contract() {
    let client = Client::new(&router().await).unwrap();

    let ack = client
        .stk_push(
            "tok",
            &StkPush {
                phone: "254712345678".to_string(),
                amount: Shillings::new(100),
            },
        )
        .await
        .unwrap();
    assert_eq!(ack.text(), Some("STK push sent"));

    let ack = client
        .update_payment(
            "tok",
            "x1",
            &PaymentUpdate {
                name: "Alice".to_string(),
                phone: "254711111111".to_string(),
                amount: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ack.text(), Some("Payment updated"));

    // Empty 200 body.
    let ack = client.delete_plot("tok", "p1").await.unwrap();
    assert!(!ack.is_rejected());
}

#[tokio::test]
async fn unreachable_backend_reads_as_offline() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(&format!("http://{addr}")).unwrap();
    let err = client.plots("tok").await.unwrap_err();
    assert!(err.is_offline(), "{err:?}");
}
