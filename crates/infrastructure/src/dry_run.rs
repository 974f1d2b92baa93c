//! `--dry-run` 模式下的协调存储与事件发布实现，只写日志，不访问外部服务

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use hax_core::{CoordinationClient, EventPublisher, HaxResult, ProcessStatusEvent};

#[derive(Debug, Default)]
pub struct LoggingCoordinationClient;

impl CoordinationClient for LoggingCoordinationClient {
    fn update_process_status(&self, event: &ProcessStatusEvent) -> HaxResult<()> {
        info!(
            "[dry-run] 进程状态 {}: {} {} pid={}",
            event.fid, event.event, event.process_type, event.pid
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingEventPublisher {
    sequence: AtomicU64,
}

impl EventPublisher for LoggingEventPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> HaxResult<String> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        info!(
            "[dry-run] 发布到 {}: {}",
            topic,
            String::from_utf8_lossy(payload)
        );
        Ok(format!("0-{seq}"))
    }
}
