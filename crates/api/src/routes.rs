use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use hax_dispatcher::{CommandProducer, DispatcherStats, StopHandle};

use crate::handlers::{
    commands::submit_command,
    dispatcher::get_dispatcher_stats,
    ha::broadcast_ha_states,
    health::health_check,
    sns::{control_sns, get_sns_status},
    stob::report_stob_ioq_error,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub producer: CommandProducer,
    pub stats: Arc<DispatcherStats>,
    pub dispatcher: StopHandle,
    /// 等待同步回复的超时
    pub reply_timeout: Duration,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // SNS修复/重平衡
        .route("/api/v1/sns/{operation}/status", get(get_sns_status))
        .route("/api/v1/sns/{operation}/{action}", post(control_sns))
        // HA状态与故障上报
        .route("/api/v1/ha/states", post(broadcast_ha_states))
        .route("/api/v1/stob-ioq", post(report_stob_ioq_error))
        // 按类型名转发的通用命令
        .route("/api/v1/commands/{kind}", post(submit_command))
        // 分发器统计
        .route("/api/v1/dispatcher/stats", get(get_dispatcher_stats))
        .with_state(state)
}
