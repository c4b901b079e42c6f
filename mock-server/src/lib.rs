use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Body of every non-200 response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub code: String,
}

type Failure = (StatusCode, Json<ApiError>);

fn failure(status: StatusCode, message: &str, code: &str) -> Failure {
    (
        status,
        Json(ApiError {
            message: message.to_string(),
            code: code.to_string(),
        }),
    )
}

/// (crypto, fiat, rate)
pub const RATES: &[(&str, &str, f64)] = &[
    ("BTC", "NGN", 98_450_000.0),
    ("ETH", "NGN", 5_120_000.0),
    ("USDT", "NGN", 1_550.25),
    ("USDT", "GHS", 15.4),
];

pub type Db = Arc<RwLock<HashMap<String, Value>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/v1/get-rate", get(get_rate))
        .route("/v1/get-exchange", get(get_exchange))
        .route("/v1/create-transaction", post(create_transaction))
        .route("/v1/get-transactions/{id}", get(get_transaction))
        .route("/api/v1/get-transactions", get(get_transaction_history))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuery {
    pub selected_crypt: Option<String>,
    pub selected_fiat: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub transaction_type: Option<String>,
    pub selected_fiat: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, Failure> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        failure(
            StatusCode::BAD_REQUEST,
            &format!("missing query parameter {name}"),
            "MISSING_PARAMETER",
        )
    })
}

fn require_bearer(headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default();
    if token.trim().is_empty() {
        return Err(failure(StatusCode::UNAUTHORIZED, "missing bearer token", "UNAUTHORIZED"));
    }
    Ok(())
}

async fn get_rate(Query(query): Query<RateQuery>) -> Result<Json<Value>, Failure> {
    let crypto = required(query.selected_crypt, "selectedCrypt")?;
    let fiat = required(query.selected_fiat, "selectedFiat")?;
    let (crypto, fiat, rate) = RATES
        .iter()
        .find(|(c, f, _)| c.eq_ignore_ascii_case(&crypto) && f.eq_ignore_ascii_case(&fiat))
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "unsupported currency pair", "INVALID_PAIR"))?;
    Ok(Json(json!({
        "selectedCrypt": crypto,
        "selectedFiat": fiat,
        "rate": rate,
    })))
}

async fn get_exchange() -> Json<Value> {
    let pairs: Vec<Value> = RATES
        .iter()
        .map(|(crypto, fiat, _)| json!({ "selectedCrypt": crypto, "selectedFiat": fiat }))
        .collect();
    Json(json!({ "name": "flincap", "pairs": pairs }))
}

async fn create_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, Failure> {
    require_bearer(&headers)?;
    let mut transaction = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => {
            return Err(failure(
                StatusCode::BAD_REQUEST,
                "transaction must be a JSON object",
                "INVALID_PAYLOAD",
            ))
        }
    };
    let id = match transaction.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            transaction.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    };
    info!(%id, "stored transaction");
    db.write().await.insert(id.clone(), Value::Object(transaction));
    Ok(Json(json!({ "message": "transaction created", "id": id })))
}

async fn get_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Failure> {
    require_bearer(&headers)?;
    let transactions = db.read().await;
    transactions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "transaction not found", "NOT_FOUND"))
}

async fn get_transaction_history(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, Failure> {
    require_bearer(&headers)?;
    let kind = required(query.transaction_type, "transactionType")?;
    let fiat = required(query.selected_fiat, "selectedFiat")?;

    let transactions = db.read().await;
    let mut matching: Vec<&Value> = transactions
        .values()
        .filter(|tx| tx["transactionType"] == kind.as_str() && tx["selectedFiat"] == fiat.as_str())
        .collect();
    matching.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
    Ok(Json(json!({ "transactions": matching })))
}
