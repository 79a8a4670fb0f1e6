use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;
use crate::util::{now_ts, ts_to_rfc3339};

pub async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "gatehouse",
    }))
}

/// Liveness including database connectivity.
pub async fn health_db(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    state.db.ping().await?;
    Ok(Json(json!(ts_to_rfc3339(now_ts()))))
}
