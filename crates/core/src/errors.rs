use thiserror::Error;

/// HA命令分发错误类型定义
#[derive(Debug, Error)]
pub enum HaxError {
    #[error("后端运行时错误: {0}")]
    Runtime(String),

    #[error("协调存储错误: {0}")]
    Coordination(String),

    #[error("事件发布错误: {0}")]
    Publish(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("无效的fid: {0}")]
    InvalidFid(String),

    #[error("无效的命令: {0}")]
    InvalidCommand(String),

    #[error("命令队列已关闭")]
    QueueClosed,

    #[error("后端运行时已被线程 {holder} 接管")]
    ThreadAlreadyAdopted { holder: String },

    #[error("操作 {operation} 在 {attempts} 次尝试后仍失败: {last_error}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type HaxResult<T> = std::result::Result<T, HaxError>;

impl HaxError {
    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        Self::Runtime(msg.into())
    }

    pub fn coordination<S: Into<String>>(msg: S) -> Self {
        Self::Coordination(msg.into())
    }

    pub fn publish<S: Into<String>>(msg: S) -> Self {
        Self::Publish(msg.into())
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// 外部协作方的瞬时故障，重试有意义
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HaxError::Runtime(_)
                | HaxError::Coordination(_)
                | HaxError::Publish(_)
        )
    }
}

impl From<serde_json::Error> for HaxError {
    fn from(err: serde_json::Error) -> Self {
        HaxError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for HaxError {
    fn from(err: anyhow::Error) -> Self {
        HaxError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(HaxError::runtime("EAGAIN").is_retryable());
        assert!(HaxError::coordination("consul unavailable").is_retryable());
        assert!(HaxError::publish("broken pipe").is_retryable());
        assert!(!HaxError::QueueClosed.is_retryable());
        assert!(!HaxError::InvalidFid("bogus".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = HaxError::RetryExhausted {
            operation: "update_process_status".to_string(),
            attempts: 3,
            last_error: "timeout".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("update_process_status"));
        assert!(text.contains('3'));
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<u32>("not-a-number").unwrap_err();
        let err: HaxError = parse_err.into();
        assert!(matches!(err, HaxError::Serialization(_)));
    }
}
