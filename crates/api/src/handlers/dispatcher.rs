use axum::extract::State;
use serde::Serialize;

use hax_dispatcher::{DispatcherState, DispatcherStatsSnapshot};

use crate::{error::ApiResult, response::success, routes::AppState};

#[derive(Debug, Serialize)]
pub struct DispatcherStatus {
    pub state: DispatcherState,
    pub pending: usize,
    #[serde(flatten)]
    pub stats: DispatcherStatsSnapshot,
}

pub async fn get_dispatcher_stats(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    Ok(success(DispatcherStatus {
        state: state.dispatcher.state(),
        pending: state.producer.pending(),
        stats: state.stats.snapshot(),
    }))
}
