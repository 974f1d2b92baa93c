//! # HAX API
//!
//! 命令分发器的HTTP接入层。处理器只负责构造命令并入队，
//! 需要结果的请求通过单次回复通道等待分发线程写回。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `POST /api/v1/sns/{repair|rebalance}/{start|stop|pause|resume}` - SNS控制，返回202
//! - `GET /api/v1/sns/{repair|rebalance}/status?fid=...` - SNS状态
//! - `POST /api/v1/ha/states` - 广播HA状态，返回消息标识
//! - `POST /api/v1/stob-ioq` - 上报存储I/O队列故障，返回202
//! - `POST /api/v1/commands/{kind}` - 按类型名转发无需回复的命令，未知类型记为不支持，返回202
//! - `GET /api/v1/dispatcher/stats` - 分发统计
//!
//! 分发线程停止后入队失败返回503，等待回复超时返回504。
//!
//! ## 使用示例
//!
//! ```bash
//! curl -X POST http://localhost:8008/api/v1/sns/repair/start \
//!   -H "Content-Type: application/json" \
//!   -d '{"fid": "0x6f00000000000001:0x1"}'
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use tower::ServiceBuilder;

pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState) -> Router {
    create_routes(state).layer(
        ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_logging)),
    )
}
