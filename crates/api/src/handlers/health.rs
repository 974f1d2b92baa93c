use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "dispatcher": state.dispatcher.state(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "hax",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
