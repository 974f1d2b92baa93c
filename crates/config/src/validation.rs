// 配置验证

use crate::{ConfigError, ConfigResult};

/// 配置验证接口
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// 常用字段检查
pub struct ValidationUtils;

impl ValidationUtils {
    /// 验证字符串非空
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// 验证超时值
    pub fn validate_timeout(timeout_seconds: u64, field_name: &str) -> ConfigResult<()> {
        if timeout_seconds == 0 {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if timeout_seconds > 3600 {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 3600 seconds"
            )));
        }
        Ok(())
    }

    /// 验证URL格式
    pub fn validate_url(url: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(url, field_name)?;

        if !url.contains("://") {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be a valid URL with protocol"
            )));
        }

        Ok(())
    }

    /// 验证监听地址
    pub fn validate_socket_addr(addr: &str, field_name: &str) -> ConfigResult<()> {
        addr.parse::<std::net::SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!("{field_name} is not a valid socket address: {e}"))
        })?;
        Ok(())
    }

    /// 验证计数值
    pub fn validate_count(count: u64, field_name: &str, max_value: u64) -> ConfigResult<()> {
        if count == 0 {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if count > max_value {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be less than or equal to {max_value}"
            )));
        }
        Ok(())
    }
}
