use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use hax_core::Command;

use crate::{
    error::{ApiError, ApiResult},
    response::accepted,
    routes::AppState,
};

/// 按类型名转发无需回复的命令
///
/// 未知类型照常入队，由分发线程记为不支持的命令。
pub async fn submit_command(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let command =
        Command::from_tagged(&kind, payload).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.producer.enqueue(command)?;
    info!("通用命令已入队: {}", kind);

    Ok(accepted(json!({ "kind": kind })))
}
