use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use hax_core::{Command, Fid, SnsAction, SnsOperation};

use super::await_reply;
use crate::{
    error::{ApiError, ApiResult},
    response::{accepted, success},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SnsRequest {
    pub fid: Fid,
}

#[derive(Debug, Deserialize)]
pub struct SnsStatusQuery {
    pub fid: Fid,
}

#[derive(Debug, Serialize)]
pub struct SnsCommandAccepted {
    pub operation: SnsOperation,
    pub action: SnsAction,
    pub fid: Fid,
}

fn parse_operation(operation: &str) -> ApiResult<SnsOperation> {
    operation.parse().map_err(ApiError::BadRequest)
}

/// 启动、停止、暂停或恢复SNS操作
pub async fn control_sns(
    State(state): State<AppState>,
    Path((operation, action)): Path<(String, String)>,
    axum::Json(request): axum::Json<SnsRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let operation = parse_operation(&operation)?;
    let action: SnsAction = action.parse().map_err(ApiError::BadRequest)?;

    state
        .producer
        .enqueue(Command::sns_control(operation, action, request.fid))?;
    info!("SNS命令已入队: {} {} {}", action, operation, request.fid);

    Ok(accepted(SnsCommandAccepted {
        operation,
        action,
        fid: request.fid,
    }))
}

/// 查询SNS操作状态
pub async fn get_sns_status(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Query(query): Query<SnsStatusQuery>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let operation = parse_operation(&operation)?;

    let (command, reply) = Command::sns_status(operation, query.fid);
    state.producer.enqueue(command)?;

    let status = await_reply(reply, state.reply_timeout).await?;
    Ok(success(status))
}
