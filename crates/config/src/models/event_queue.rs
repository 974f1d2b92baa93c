use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// 事件队列（Redis Stream）配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventQueueConfig {
    pub redis_url: String,
    /// 每个主题保留的近似最大条目数
    pub max_stream_length: u64,
    pub connection_timeout_seconds: u64,
}

impl Default for EventQueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            max_stream_length: 100_000,
            connection_timeout_seconds: 5,
        }
    }
}

impl ConfigValidator for EventQueueConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_url(&self.redis_url, "event_queue.redis_url")?;
        ValidationUtils::validate_count(
            self.max_stream_length,
            "event_queue.max_stream_length",
            100_000_000,
        )?;
        ValidationUtils::validate_timeout(
            self.connection_timeout_seconds,
            "event_queue.connection_timeout_seconds",
        )?;
        Ok(())
    }
}

/// 协调存储（Consul KV）配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsulConfig {
    pub url: String,
    pub kv_prefix: String,
    pub request_timeout_seconds: u64,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8500".to_string(),
            kv_prefix: "hax".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl ConfigValidator for ConsulConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_url(&self.url, "consul.url")?;
        ValidationUtils::validate_not_empty(&self.kv_prefix, "consul.kv_prefix")?;
        ValidationUtils::validate_timeout(
            self.request_timeout_seconds,
            "consul.request_timeout_seconds",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_config_validation() {
        let config = EventQueueConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = config.clone();
        invalid_config.redis_url = "127.0.0.1:6379".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = config.clone();
        invalid_config.max_stream_length = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_consul_config_validation() {
        let config = ConsulConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = config.clone();
        invalid_config.kv_prefix = " ".to_string();
        assert!(invalid_config.validate().is_err());
    }
}
