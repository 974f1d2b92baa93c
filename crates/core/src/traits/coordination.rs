use crate::models::ProcessStatusEvent;
use crate::HaxResult;

/// 集群协调存储客户端
pub trait CoordinationClient: Send + Sync {
    /// 持久化进程状态变化
    fn update_process_status(&self, event: &ProcessStatusEvent) -> HaxResult<()>;
}
