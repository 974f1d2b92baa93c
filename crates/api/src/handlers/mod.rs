pub mod commands;
pub mod dispatcher;
pub mod ha;
pub mod health;
pub mod sns;
pub mod stob;

use std::time::Duration;

use hax_core::ReplyReceiver;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// 等待分发线程写回结果
pub(crate) async fn await_reply<T>(reply: ReplyReceiver<T>, timeout: Duration) -> ApiResult<T> {
    match tokio::time::timeout(timeout, reply).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(ApiError::NoReply),
        Err(_) => {
            warn!("等待分发线程回复超时 ({:?})", timeout);
            Err(ApiError::ReplyTimeout)
        }
    }
}
