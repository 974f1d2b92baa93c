use serde::{Deserialize, Serialize};

use super::logging::{LogLevel, OutputFormat};
use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
    /// 等待分发线程回复的超时（秒）
    pub reply_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8008".to_string(),
            reply_timeout_seconds: 30,
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.enabled {
            ValidationUtils::validate_socket_addr(&self.bind_address, "api.bind_address")?;
        }
        ValidationUtils::validate_timeout(self.reply_timeout_seconds, "api.reply_timeout_seconds")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: LogLevel,
    pub log_format: OutputFormat,
    pub metrics_enabled: bool,
    pub metrics_bind_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: OutputFormat::Pretty,
            metrics_enabled: false,
            metrics_bind_address: "0.0.0.0:9108".to_string(),
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.metrics_enabled {
            ValidationUtils::validate_socket_addr(
                &self.metrics_bind_address,
                "observability.metrics_bind_address",
            )?;
        }
        Ok(())
    }
}
