use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// 可重试handler的重试配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// 两次尝试之间的固定间隔（秒）
    pub delay_seconds: u64,
    /// 最大尝试次数，未设置时无限重试
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 5,
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.delay_seconds)
    }
}

impl ConfigValidator for RetryConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_timeout(self.delay_seconds, "retry.delay_seconds")?;

        if self.max_attempts == Some(0) {
            return Err(crate::ConfigError::Validation(
                "retry.max_attempts must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_seconds, 5);
        assert_eq!(config.max_attempts, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        config.max_attempts = Some(0);
        assert!(config.validate().is_err());

        config.max_attempts = Some(10);
        assert!(config.validate().is_ok());

        config.delay_seconds = 0;
        assert!(config.validate().is_err());
    }
}
