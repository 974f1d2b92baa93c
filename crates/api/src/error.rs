use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hax_core::HaxError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("分发错误: {0}")]
    Dispatch(#[from] HaxError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("等待分发线程回复超时")]
    ReplyTimeout,

    #[error("命令处理失败，未返回结果")]
    NoReply,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Dispatch(HaxError::QueueClosed) => {
                (StatusCode::SERVICE_UNAVAILABLE, "DISPATCHER_STOPPED")
            }
            ApiError::Dispatch(HaxError::InvalidFid(_)) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::ReplyTimeout => (StatusCode::GATEWAY_TIMEOUT, "REPLY_TIMEOUT"),
            ApiError::NoReply => (StatusCode::BAD_GATEWAY, "NO_REPLY"),
            ApiError::Dispatch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.parts();

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "code": status.as_u16(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
