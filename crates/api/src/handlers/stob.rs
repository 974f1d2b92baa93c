use axum::extract::State;
use axum::Json;
use tracing::info;

use hax_core::{Command, StobIoqError};

use crate::{error::ApiResult, response::accepted, routes::AppState};

/// 上报存储I/O队列故障
pub async fn report_stob_ioq_error(
    State(state): State<AppState>,
    Json(report): Json<StobIoqError>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let fid = report.fid;
    state.producer.enqueue(Command::StobIoqError(report))?;
    info!("存储I/O队列故障已入队: {}", fid);

    Ok(accepted(fid))
}
