use std::sync::Arc;

use tracing::{debug, info, warn};

use hax_core::{
    Command, CoordinationClient, EventPublisher, Fid, HaxResult, ReplySender, RuntimeFacade,
    SnsAction, SnsOperation, SnsStatus, STOB_IOQ_TOPIC,
};

use crate::retry::RetryWrapper;
use crate::stats::DispatcherStats;

/// 路由结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Handled,
    Unsupported,
}

/// 命令路由
///
/// 每种命令对应唯一的handler。进程事件和健康向量查询经过重试包装，
/// 其余命令失败时直接返回错误，由分发循环记录并继续。
pub struct CommandRouter {
    coordination: Arc<dyn CoordinationClient>,
    publisher: Arc<dyn EventPublisher>,
    retry: RetryWrapper,
    stats: Arc<DispatcherStats>,
}

impl CommandRouter {
    pub fn new(
        coordination: Arc<dyn CoordinationClient>,
        publisher: Arc<dyn EventPublisher>,
        retry: RetryWrapper,
        stats: Arc<DispatcherStats>,
    ) -> Self {
        Self {
            coordination,
            publisher,
            retry,
            stats,
        }
    }

    pub fn set_retry(&mut self, retry: RetryWrapper) {
        self.retry = retry;
    }

    pub fn retry(&self) -> &RetryWrapper {
        &self.retry
    }

    /// 在已接管的后端线程上处理一条命令
    pub fn route(&self, runtime: &dyn RuntimeFacade, command: Command) -> HaxResult<Routed> {
        match command {
            Command::EntrypointRequest(request) => {
                info!(
                    "处理入口请求: process={}, endpoint={}",
                    request.process_fid, request.remote_rpc_endpoint
                );
                runtime.reply_to_entrypoint(&request)?;
            }
            Command::ProcessEvent(event) => {
                info!(
                    "更新进程状态: fid={}, event={}, type={}",
                    event.fid, event.event, event.process_type
                );
                self.retry
                    .run("process_event", || {
                        self.coordination.update_process_status(&event)
                    })
                    .into_result("process_event")?;
            }
            Command::HaNvecGetEvent(event) => {
                debug!("处理健康向量查询: {} 项", event.nvec.len());
                self.retry
                    .run("ha_nvec_get", || runtime.reply_to_nvec_get(&event))
                    .into_result("ha_nvec_get")?;
            }
            Command::BroadcastHaStates { states, reply_to } => {
                info!("广播 {} 条HA状态", states.len());
                let ids = runtime.broadcast_ha_states(&states)?;
                if let Some(reply_to) = reply_to {
                    self.reply("broadcast_ha_states", reply_to, ids);
                }
            }
            Command::StobIoqError(report) => {
                info!("发布存储I/O队列故障: fid={}, rc={}", report.fid, report.rc);
                let payload = report.to_payload()?;
                let offset = self.publisher.publish(STOB_IOQ_TOPIC, &payload)?;
                debug!("故障事件已写入 {}: {}", STOB_IOQ_TOPIC, offset);
            }
            Command::SnsRepairStatus { fid, reply_to } => {
                self.status(runtime, SnsOperation::Repair, fid, reply_to)?;
            }
            Command::SnsRebalanceStatus { fid, reply_to } => {
                self.status(runtime, SnsOperation::Rebalance, fid, reply_to)?;
            }
            Command::SnsRepairStart(fid) => {
                Self::control(runtime, SnsOperation::Repair, SnsAction::Start, fid)?;
            }
            Command::SnsRepairStop(fid) => {
                Self::control(runtime, SnsOperation::Repair, SnsAction::Stop, fid)?;
            }
            Command::SnsRepairPause(fid) => {
                Self::control(runtime, SnsOperation::Repair, SnsAction::Pause, fid)?;
            }
            Command::SnsRepairResume(fid) => {
                Self::control(runtime, SnsOperation::Repair, SnsAction::Resume, fid)?;
            }
            Command::SnsRebalanceStart(fid) => {
                Self::control(runtime, SnsOperation::Rebalance, SnsAction::Start, fid)?;
            }
            Command::SnsRebalanceStop(fid) => {
                Self::control(runtime, SnsOperation::Rebalance, SnsAction::Stop, fid)?;
            }
            Command::SnsRebalancePause(fid) => {
                Self::control(runtime, SnsOperation::Rebalance, SnsAction::Pause, fid)?;
            }
            Command::SnsRebalanceResume(fid) => {
                Self::control(runtime, SnsOperation::Rebalance, SnsAction::Resume, fid)?;
            }
            Command::Unsupported { kind } => {
                warn!("不支持的命令类型: {}，已忽略", kind);
                self.stats.record_unsupported(&kind);
                return Ok(Routed::Unsupported);
            }
        }

        Ok(Routed::Handled)
    }

    fn status(
        &self,
        runtime: &dyn RuntimeFacade,
        operation: SnsOperation,
        fid: Fid,
        reply_to: ReplySender<Vec<SnsStatus>>,
    ) -> HaxResult<()> {
        let status = runtime.sns_status(operation, &fid)?;
        debug!("{} 状态 {}: {} 项", operation, fid, status.len());
        self.reply(&format!("sns_{operation}_status"), reply_to, status);
        Ok(())
    }

    fn control(
        runtime: &dyn RuntimeFacade,
        operation: SnsOperation,
        action: SnsAction,
        fid: Fid,
    ) -> HaxResult<()> {
        info!("SNS {} {}: {}", operation, action, fid);
        runtime.sns_control(operation, action, &fid)
    }

    fn reply<T>(&self, kind: &str, reply_to: ReplySender<T>, value: T) {
        if reply_to.send(value).is_err() {
            debug!("{} 的回复接收端已关闭，丢弃回复", kind);
            self.stats.record_reply_dropped(kind);
        }
    }
}
