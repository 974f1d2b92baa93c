use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 分发线程名
    pub thread_name: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            thread_name: "qconsumer".to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

impl ConfigValidator for DispatcherConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_count(self.poll_interval_ms, "dispatcher.poll_interval_ms", 60_000)?;
        ValidationUtils::validate_not_empty(&self.thread_name, "dispatcher.thread_name")?;
        Ok(())
    }
}
