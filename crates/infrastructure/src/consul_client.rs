use std::sync::OnceLock;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use hax_config::ConsulConfig;
use hax_core::{CoordinationClient, HaxError, HaxResult, ProcessStatusEvent};

/// 写入Consul KV的进程状态
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessStatusRecord {
    pub state: String,
    #[serde(rename = "type")]
    pub process_type: String,
    pub pid: u32,
}

impl From<&ProcessStatusEvent> for ProcessStatusRecord {
    fn from(event: &ProcessStatusEvent) -> Self {
        Self {
            state: event.event.to_string(),
            process_type: event.process_type.to_string(),
            pid: event.pid,
        }
    }
}

/// 基于Consul KV的协调存储客户端
///
/// 使用阻塞HTTP客户端，只应在分发线程上调用。客户端在第一次调用时创建，
/// 以免在异步运行时内部构造。
pub struct ConsulCoordinationClient {
    config: ConsulConfig,
    http: OnceLock<reqwest::blocking::Client>,
}

impl ConsulCoordinationClient {
    pub fn new(config: &ConsulConfig) -> Self {
        info!("创建Consul协调存储客户端: {}", config.url);
        Self {
            config: config.clone(),
            http: OnceLock::new(),
        }
    }

    /// 进程状态在KV中的地址
    pub fn process_key_url(&self, event: &ProcessStatusEvent) -> String {
        format!(
            "{}/v1/kv/{}/processes/{}",
            self.config.url.trim_end_matches('/'),
            self.config.kv_prefix.trim_matches('/'),
            event.fid
        )
    }

    fn http(&self) -> HaxResult<&reqwest::blocking::Client> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.request_timeout_seconds))
            .build()
            .map_err(|e| HaxError::coordination(format!("创建HTTP客户端失败: {e}")))?;

        Ok(self.http.get_or_init(|| client))
    }
}

impl CoordinationClient for ConsulCoordinationClient {
    fn update_process_status(&self, event: &ProcessStatusEvent) -> HaxResult<()> {
        let url = self.process_key_url(event);
        let record = ProcessStatusRecord::from(event);

        let response = self
            .http()?
            .put(&url)
            .json(&record)
            .send()
            .map_err(|e| HaxError::coordination(format!("写入Consul失败: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HaxError::coordination(format!(
                "Consul返回状态码 {status}: {url}"
            )));
        }

        debug!("进程状态已写入 {}: {}", url, record.state);
        Ok(())
    }
}
