use crate::models::{
    EntrypointRequest, Fid, HaNvecGetEvent, HaState, MessageId, SnsAction, SnsOperation, SnsStatus,
};
use crate::HaxResult;

/// 后端运行时门面
///
/// 后端接口只能在一个已接管（adopt）的线程上调用。所有方法都是同步的，
/// 调用方负责保证线程亲和性，见分发器的 `ThreadAffinity`。
pub trait RuntimeFacade: Send + Sync {
    /// 将当前线程注册为后端线程
    fn adopt_thread(&self) -> HaxResult<()>;

    /// 注销当前线程
    fn release_thread(&self) -> HaxResult<()>;

    /// 回复节点的入口协商请求
    fn reply_to_entrypoint(&self, request: &EntrypointRequest) -> HaxResult<()>;

    /// 回复健康向量查询
    fn reply_to_nvec_get(&self, event: &HaNvecGetEvent) -> HaxResult<()>;

    /// 向后端广播HA状态，返回每次投递的消息标识
    fn broadcast_ha_states(&self, states: &[HaState]) -> HaxResult<Vec<MessageId>>;

    fn get_repair_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>>;

    fn get_rebalance_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>>;

    fn start_repair(&self, fid: &Fid) -> HaxResult<()>;

    fn stop_repair(&self, fid: &Fid) -> HaxResult<()>;

    fn pause_repair(&self, fid: &Fid) -> HaxResult<()>;

    fn resume_repair(&self, fid: &Fid) -> HaxResult<()>;

    fn start_rebalance(&self, fid: &Fid) -> HaxResult<()>;

    fn stop_rebalance(&self, fid: &Fid) -> HaxResult<()>;

    fn pause_rebalance(&self, fid: &Fid) -> HaxResult<()>;

    fn resume_rebalance(&self, fid: &Fid) -> HaxResult<()>;

    /// 查询SNS状态
    fn sns_status(&self, operation: SnsOperation, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        match operation {
            SnsOperation::Repair => self.get_repair_status(fid),
            SnsOperation::Rebalance => self.get_rebalance_status(fid),
        }
    }

    /// 执行SNS控制动作
    fn sns_control(&self, operation: SnsOperation, action: SnsAction, fid: &Fid) -> HaxResult<()> {
        match (operation, action) {
            (SnsOperation::Repair, SnsAction::Start) => self.start_repair(fid),
            (SnsOperation::Repair, SnsAction::Stop) => self.stop_repair(fid),
            (SnsOperation::Repair, SnsAction::Pause) => self.pause_repair(fid),
            (SnsOperation::Repair, SnsAction::Resume) => self.resume_repair(fid),
            (SnsOperation::Rebalance, SnsAction::Start) => self.start_rebalance(fid),
            (SnsOperation::Rebalance, SnsAction::Stop) => self.stop_rebalance(fid),
            (SnsOperation::Rebalance, SnsAction::Pause) => self.pause_rebalance(fid),
            (SnsOperation::Rebalance, SnsAction::Resume) => self.resume_rebalance(fid),
        }
    }
}
