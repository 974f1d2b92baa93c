//! HA命令分发
//!
//! 多个生产者并发地把 [`Command`](hax_core::Command) 放入命令队列，
//! 唯一的分发线程接管后端运行时后按入队顺序逐条处理：
//!
//! ```text
//! CommandProducer ──enqueue──▶ 队列 ──try_dequeue──▶ Dispatcher ──route──▶ handler
//! ```
//!
//! - [`queue`]：多生产者单消费者的无界队列，关闭后拒绝入队
//! - [`retry`]：固定间隔重试，可选最大尝试次数
//! - [`affinity`]：后端运行时的单线程接管守卫
//! - [`router`]：命令到handler的路由表
//! - [`dispatcher`]：轮询循环、失败隔离与停止协议
//! - [`stats`]：失败通道，计数器与最近一次失败

pub mod affinity;
pub mod dispatcher;
pub mod queue;
pub mod retry;
pub mod router;
pub mod stats;

pub use affinity::{AdoptedRuntime, ThreadAffinity};
pub use dispatcher::{
    Dispatcher, DispatcherHandle, DispatcherState, StopHandle, DEFAULT_POLL_INTERVAL,
    DEFAULT_THREAD_NAME,
};
pub use queue::{command_queue, CommandConsumer, CommandProducer};
pub use retry::{RetryOutcome, RetryPolicy, RetryWrapper};
pub use router::{CommandRouter, Routed};
pub use stats::{DispatcherStats, DispatcherStatsSnapshot, FailureRecord};
