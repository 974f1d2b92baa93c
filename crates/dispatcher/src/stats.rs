use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

/// 最近一次失败的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 失败命令的类型
    pub kind: String,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// 分发统计的只读快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatcherStatsSnapshot {
    pub handled: u64,
    pub failed: u64,
    pub panicked: u64,
    pub unsupported: u64,
    pub retries: u64,
    pub retry_exhausted: u64,
    pub replies_dropped: u64,
    pub last_failure: Option<FailureRecord>,
}

impl DispatcherStatsSnapshot {
    /// 被隔离的失败总数（错误与panic）
    pub fn contained_failures(&self) -> u64 {
        self.failed + self.panicked
    }
}

/// 分发线程的失败通道
///
/// 计数器无锁更新，可以从任意线程读取。每次记录同时写入
/// `hax_dispatcher_*` 指标，标签 `kind` 为命令类型。
#[derive(Debug, Default)]
pub struct DispatcherStats {
    handled: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
    unsupported: AtomicU64,
    retries: AtomicU64,
    retry_exhausted: AtomicU64,
    replies_dropped: AtomicU64,
    last_failure: Mutex<Option<FailureRecord>>,
}

impl DispatcherStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_handled(&self, kind: &str) {
        self.handled.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_commands_handled_total", "kind" => kind.to_owned()).increment(1);
    }

    pub fn record_failure(&self, kind: &str, error: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_command_failures_total", "kind" => kind.to_owned()).increment(1);
        self.remember(kind, error);
    }

    pub fn record_panic(&self, kind: &str, message: &str) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_command_panics_total", "kind" => kind.to_owned()).increment(1);
        self.remember(kind, &format!("panic: {message}"));
    }

    pub fn record_unsupported(&self, kind: &str) {
        self.unsupported.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_unsupported_commands_total", "kind" => kind.to_owned())
            .increment(1);
    }

    /// 记录一次失败的重试尝试
    pub fn record_retry(&self, kind: &str) {
        self.retries.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_retry_attempts_total", "kind" => kind.to_owned()).increment(1);
    }

    pub fn record_retry_exhausted(&self, kind: &str) {
        self.retry_exhausted.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_retries_exhausted_total", "kind" => kind.to_owned()).increment(1);
    }

    /// 回复接收端已被丢弃
    pub fn record_reply_dropped(&self, kind: &str) {
        self.replies_dropped.fetch_add(1, Ordering::Relaxed);
        counter!("hax_dispatcher_replies_dropped_total", "kind" => kind.to_owned()).increment(1);
    }

    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            retry_exhausted: self.retry_exhausted.load(Ordering::Relaxed),
            replies_dropped: self.replies_dropped.load(Ordering::Relaxed),
            last_failure: self.last_failure(),
        }
    }

    pub fn last_failure(&self) -> Option<FailureRecord> {
        self.last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, kind: &str, error: &str) {
        let record = FailureRecord {
            kind: kind.to_string(),
            error: error.to_string(),
            at: Utc::now(),
        };
        *self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(record);
    }
}
