use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Fid;

/// 节点加入集群时发出的入口协商请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrypointRequest {
    /// 后端侧的回复上下文句柄
    pub reply_context: u64,
    pub req_id: Uuid,
    pub remote_rpc_endpoint: String,
    pub process_fid: Fid,
    pub git_rev: String,
    pub pid: u32,
    pub is_first_request: bool,
}

/// 进程事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessEventKind {
    Starting,
    Started,
    Stopping,
    Stopped,
    Unknown,
}

impl std::fmt::Display for ProcessEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ProcessEventKind::Starting => "M0_CONF_HA_PROCESS_STARTING",
            ProcessEventKind::Started => "M0_CONF_HA_PROCESS_STARTED",
            ProcessEventKind::Stopping => "M0_CONF_HA_PROCESS_STOPPING",
            ProcessEventKind::Stopped => "M0_CONF_HA_PROCESS_STOPPED",
            ProcessEventKind::Unknown => "M0_CONF_HA_PROCESS_UNKNOWN",
        };
        write!(f, "{text}")
    }
}

/// 进程类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Kernel,
    M0d,
    M0mkfs,
    Other,
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ProcessType::Kernel => "M0_CONF_HA_PROCESS_KERNEL",
            ProcessType::M0d => "M0_CONF_HA_PROCESS_M0D",
            ProcessType::M0mkfs => "M0_CONF_HA_PROCESS_M0MKFS",
            ProcessType::Other => "M0_CONF_HA_PROCESS_OTHER",
        };
        write!(f, "{text}")
    }
}

/// 需要写入协调存储的进程状态变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStatusEvent {
    pub fid: Fid,
    pub event: ProcessEventKind,
    pub process_type: ProcessType,
    pub pid: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_event_display() {
        assert_eq!(
            ProcessEventKind::Started.to_string(),
            "M0_CONF_HA_PROCESS_STARTED"
        );
        assert_eq!(ProcessType::M0d.to_string(), "M0_CONF_HA_PROCESS_M0D");
    }

    #[test]
    fn test_process_status_event_serde() {
        let event = ProcessStatusEvent {
            fid: Fid::new(0x7200000000000001, 0x15),
            event: ProcessEventKind::Stopping,
            process_type: ProcessType::M0d,
            pid: 4242,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"stopping\""));
        let back: ProcessStatusEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
