use axum::extract::State;
use axum::Json;

use hax_core::{Command, HaState};

use super::await_reply;
use crate::{error::ApiResult, response::success, routes::AppState};

/// 广播HA状态，返回后端分配的消息标识
pub async fn broadcast_ha_states(
    State(state): State<AppState>,
    Json(states): Json<Vec<HaState>>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let (command, reply) = Command::broadcast_ha_states_with_reply(states);
    state.producer.enqueue(command)?;

    let ids = await_reply(reply, state.reply_timeout).await?;
    Ok(success(ids))
}
