use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use hax_config::{DispatcherConfig, RetryConfig};
use hax_core::{
    Command, CoordinationClient, EventPublisher, HaxError, HaxResult, RuntimeFacade,
};

use crate::affinity::ThreadAffinity;
use crate::queue::CommandConsumer;
use crate::retry::{RetryPolicy, RetryWrapper};
use crate::router::{CommandRouter, Routed};
use crate::stats::DispatcherStats;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_THREAD_NAME: &str = "qconsumer";

/// 分发线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    Running,
    StopRequested,
    Stopped,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Running,
            1 => DispatcherState::StopRequested,
            _ => DispatcherState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            DispatcherState::Running => 0,
            DispatcherState::StopRequested => 1,
            DispatcherState::Stopped => 2,
        }
    }
}

impl std::fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatcherState::Running => write!(f, "running"),
            DispatcherState::StopRequested => write!(f, "stop_requested"),
            DispatcherState::Stopped => write!(f, "stopped"),
        }
    }
}

/// 停止分发线程的句柄
///
/// 可在任意线程调用，多次调用等同一次。只设置标志，不等待队列清空。
#[derive(Debug, Clone)]
pub struct StopHandle {
    state: Arc<AtomicU8>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(DispatcherState::Running.as_u8())),
        }
    }

    pub fn stop(&self) {
        let requested = self.state.compare_exchange(
            DispatcherState::Running.as_u8(),
            DispatcherState::StopRequested.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        if requested.is_ok() {
            info!("已请求停止命令处理线程");
        }
    }

    pub fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state() != DispatcherState::Running
    }

    fn mark_stopped(&self) {
        self.state
            .store(DispatcherState::Stopped.as_u8(), Ordering::SeqCst);
    }
}

/// 命令分发器
///
/// 在专用线程上依次取出命令并路由到对应handler。队列为空时检查停止标志，
/// 未停止则休眠一个轮询间隔。取到命令后不检查停止标志，
/// 因此停止前已入队的命令都会被处理。
pub struct Dispatcher {
    consumer: CommandConsumer,
    runtime: Arc<dyn RuntimeFacade>,
    router: CommandRouter,
    stats: Arc<DispatcherStats>,
    stop: StopHandle,
    poll_interval: Duration,
    thread_name: String,
}

impl Dispatcher {
    pub fn new(
        consumer: CommandConsumer,
        runtime: Arc<dyn RuntimeFacade>,
        coordination: Arc<dyn CoordinationClient>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let stats = Arc::new(DispatcherStats::new());
        let router = CommandRouter::new(
            coordination,
            publisher,
            RetryWrapper::with_stats(RetryPolicy::default(), Arc::clone(&stats)),
            Arc::clone(&stats),
        );

        Self {
            consumer,
            runtime,
            router,
            stats,
            stop: StopHandle::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// 按配置设置轮询间隔、线程名和重试策略
    pub fn with_config(self, dispatcher: &DispatcherConfig, retry: &RetryConfig) -> Self {
        self.with_poll_interval(dispatcher.poll_interval())
            .with_thread_name(dispatcher.thread_name.clone())
            .with_retry_policy(RetryPolicy::from(retry))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.router
            .set_retry(RetryWrapper::with_stats(policy, Arc::clone(&self.stats)));
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stats(&self) -> Arc<DispatcherStats> {
        Arc::clone(&self.stats)
    }

    /// 在新线程上运行分发循环
    pub fn spawn(self) -> HaxResult<DispatcherHandle> {
        let stop = self.stop_handle();
        let stats = self.stats();
        let thread_name = self.thread_name.clone();

        let thread = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || self.run())
            .map_err(|e| HaxError::Internal(format!("启动线程 {thread_name} 失败: {e}")))?;

        Ok(DispatcherHandle {
            stop,
            stats,
            thread,
        })
    }

    /// 在当前线程上运行分发循环，直到停止且队列清空
    pub fn run(mut self) -> HaxResult<()> {
        let affinity = ThreadAffinity::new(Arc::clone(&self.runtime));

        let result = match affinity.adopt() {
            Ok(runtime) => {
                info!("命令处理线程已启动，轮询间隔 {:?}", self.poll_interval);
                self.poll_loop(&*runtime);
                Ok(())
            }
            Err(e) => {
                error!("接管后端运行时失败，命令处理线程退出: {}", e);
                self.discard_pending();
                Err(e)
            }
        };

        self.stop.mark_stopped();
        info!("命令处理线程已停止");
        result
    }

    fn poll_loop(&mut self, runtime: &dyn RuntimeFacade) {
        loop {
            match self.consumer.try_dequeue() {
                Some(command) => self.dispatch(runtime, command),
                None => {
                    if self.stop.is_stop_requested() {
                        break;
                    }
                    std::thread::sleep(self.poll_interval);
                }
            }
        }

        // 关闭后仍要处理关闭前已成功入队的命令
        self.consumer.close();
        while let Some(command) = self.consumer.try_dequeue() {
            self.dispatch(runtime, command);
        }
        debug!("命令队列已清空并关闭");
    }

    /// 关闭队列并把已入队的命令逐条记为失败
    fn discard_pending(&mut self) {
        self.consumer.close();
        let mut discarded = 0usize;
        while let Some(command) = self.consumer.try_dequeue() {
            self.stats
                .record_failure(command.kind(), "后端运行时接管失败，命令被丢弃");
            discarded += 1;
        }
        if discarded > 0 {
            error!("后端运行时接管失败，丢弃 {} 条已入队命令", discarded);
        }
    }

    fn dispatch(&self, runtime: &dyn RuntimeFacade, command: Command) {
        let kind = command.kind().to_string();
        debug!("处理命令: {}", kind);

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.router.route(runtime, command)));

        match result {
            Ok(Ok(Routed::Handled)) => self.stats.record_handled(&kind),
            Ok(Ok(Routed::Unsupported)) => {}
            Ok(Err(e)) => {
                error!("处理命令 {} 失败，继续处理后续命令: {}", kind, e);
                self.stats.record_failure(&kind, &e.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("处理命令 {} 时发生panic，继续处理后续命令: {}", kind, message);
                self.stats.record_panic(&kind, &message);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// 运行中的分发线程
pub struct DispatcherHandle {
    stop: StopHandle,
    stats: Arc<DispatcherStats>,
    thread: JoinHandle<HaxResult<()>>,
}

impl DispatcherHandle {
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> DispatcherState {
        self.stop.state()
    }

    pub fn stats(&self) -> Arc<DispatcherStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// 等待线程退出
    pub fn join(self) -> HaxResult<()> {
        match self.thread.join() {
            Ok(result) => result,
            Err(payload) => Err(HaxError::Internal(format!(
                "命令处理线程异常退出: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// 请求停止并等待队列清空
    pub fn stop_and_join(self) -> HaxResult<()> {
        self.stop();
        self.join()
    }
}
