//! 分发器的外部协作方实现
//!
//! - [`RedisEventPublisher`]：事件日志（Redis Stream）
//! - [`ConsulCoordinationClient`]：协调存储（Consul KV）
//! - [`DetachedRuntime`]：不连接原生后端的运行时
//! - [`LoggingCoordinationClient`] / [`LoggingEventPublisher`]：`--dry-run` 下只写日志

pub mod consul_client;
pub mod detached_runtime;
pub mod dry_run;
pub mod redis_event_publisher;

pub use consul_client::{ConsulCoordinationClient, ProcessStatusRecord};
pub use detached_runtime::DetachedRuntime;
pub use dry_run::{LoggingCoordinationClient, LoggingEventPublisher};
pub use redis_event_publisher::RedisEventPublisher;
