//! 不连接原生后端的运行时
//!
//! 用于 `--dry-run` 和没有后端库的环境。所有调用只写日志，
//! 但会检查线程接管关系，并在内存中维护SNS操作的状态，
//! 使状态查询能反映之前的控制命令。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::ThreadId;

use tracing::{debug, info};

use hax_core::{
    EntrypointRequest, Fid, HaNvecGetEvent, HaState, HaxError, HaxResult, MessageId,
    RuntimeFacade, SnsAction, SnsOperation, SnsState, SnsStatus,
};

#[derive(Debug, Default)]
struct DetachedState {
    adopted_by: Option<(ThreadId, String)>,
    sns: HashMap<(SnsOperation, Fid), SnsState>,
}

#[derive(Debug)]
pub struct DetachedRuntime {
    halink_ctx: u64,
    next_tag: AtomicU64,
    state: Mutex<DetachedState>,
}

impl Default for DetachedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl DetachedRuntime {
    pub fn new() -> Self {
        Self {
            halink_ctx: 1,
            next_tag: AtomicU64::new(1),
            state: Mutex::new(DetachedState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DetachedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 只有接管线程可以调用后端
    fn ensure_adopted(&self) -> HaxResult<()> {
        let state = self.lock();
        match &state.adopted_by {
            Some((thread_id, _)) if *thread_id == std::thread::current().id() => Ok(()),
            Some((_, holder)) => Err(HaxError::runtime(format!(
                "后端运行时由线程 {holder} 接管，当前线程不能调用"
            ))),
            None => Err(HaxError::runtime("后端运行时尚未被任何线程接管")),
        }
    }

    fn control(&self, operation: SnsOperation, action: SnsAction, fid: &Fid) -> HaxResult<()> {
        self.ensure_adopted()?;
        info!("[detached] {} {}: {}", action, operation, fid);

        let next = match action {
            SnsAction::Start | SnsAction::Resume => SnsState::Started,
            SnsAction::Pause => SnsState::Paused,
            SnsAction::Stop => SnsState::Idle,
        };
        self.lock().sns.insert((operation, *fid), next);
        Ok(())
    }

    fn status(&self, operation: SnsOperation, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        self.ensure_adopted()?;
        let state = self
            .lock()
            .sns
            .get(&(operation, *fid))
            .copied()
            .unwrap_or_default();
        debug!("[detached] {} 状态 {}: {:?}", operation, fid, state);

        Ok(vec![SnsStatus {
            fid: *fid,
            state,
            progress: 0,
        }])
    }
}

impl RuntimeFacade for DetachedRuntime {
    fn adopt_thread(&self) -> HaxResult<()> {
        let current = std::thread::current();
        let name = current
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", current.id()));

        let mut state = self.lock();
        match &state.adopted_by {
            Some((thread_id, _)) if *thread_id == current.id() => Ok(()),
            Some((_, holder)) => Err(HaxError::ThreadAlreadyAdopted {
                holder: holder.clone(),
            }),
            None => {
                info!("[detached] 线程 {} 接管后端运行时", name);
                state.adopted_by = Some((current.id(), name));
                Ok(())
            }
        }
    }

    fn release_thread(&self) -> HaxResult<()> {
        self.ensure_adopted()?;
        if let Some((_, name)) = self.lock().adopted_by.take() {
            info!("[detached] 线程 {} 释放后端运行时", name);
        }
        Ok(())
    }

    fn reply_to_entrypoint(&self, request: &EntrypointRequest) -> HaxResult<()> {
        self.ensure_adopted()?;
        info!(
            "[detached] 回复入口请求 {}: process={}, first={}",
            request.req_id, request.process_fid, request.is_first_request
        );
        Ok(())
    }

    fn reply_to_nvec_get(&self, event: &HaNvecGetEvent) -> HaxResult<()> {
        self.ensure_adopted()?;
        info!(
            "[detached] 回复健康向量查询 {}: {} 项",
            event.hax_msg,
            event.nvec.len()
        );
        Ok(())
    }

    fn broadcast_ha_states(&self, states: &[HaState]) -> HaxResult<Vec<MessageId>> {
        self.ensure_adopted()?;
        let ids = states
            .iter()
            .map(|state| {
                let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
                debug!("[detached] 广播 {} -> {} (tag {})", state.fid, state.status, tag);
                MessageId {
                    halink_ctx: self.halink_ctx,
                    tag,
                }
            })
            .collect();
        Ok(ids)
    }

    fn get_repair_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        self.status(SnsOperation::Repair, fid)
    }

    fn get_rebalance_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        self.status(SnsOperation::Rebalance, fid)
    }

    fn start_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Repair, SnsAction::Start, fid)
    }

    fn stop_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Repair, SnsAction::Stop, fid)
    }

    fn pause_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Repair, SnsAction::Pause, fid)
    }

    fn resume_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Repair, SnsAction::Resume, fid)
    }

    fn start_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Rebalance, SnsAction::Start, fid)
    }

    fn stop_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Rebalance, SnsAction::Stop, fid)
    }

    fn pause_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Rebalance, SnsAction::Pause, fid)
    }

    fn resume_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.control(SnsOperation::Rebalance, SnsAction::Resume, fid)
    }
}
