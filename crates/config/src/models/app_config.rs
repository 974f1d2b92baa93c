use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    dispatcher::DispatcherConfig,
    event_queue::{ConsulConfig, EventQueueConfig},
    resilience::RetryConfig,
};
use crate::validation::ConfigValidator;

/// 默认查找的配置文件路径，按顺序取第一个存在的
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = ["config/hax.toml", "hax.toml", "/etc/hax/config.toml"];

/// 环境变量前缀，如 `HAX_DISPATCHER__POLL_INTERVAL_MS=500`
pub const ENV_PREFIX: &str = "HAX";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub retry: RetryConfig,
    pub event_queue: EventQueueConfig,
    pub consul: ConsulConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 加载配置：内置默认值，然后是TOML文件，最后是 `HAX_` 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = toml::to_string(&AppConfig::default()).context("序列化默认配置失败")?;
        let mut builder =
            ConfigBuilder::builder().add_source(File::from_str(&defaults, FileFormat::Toml));

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.dispatcher.validate()?;
        self.retry.validate()?;
        self.event_queue.validate()?;
        self.consul.validate()?;
        self.api.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
