use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hax_api::{create_app, AppState};
use hax_config::AppConfig;
use hax_core::{CoordinationClient, EventPublisher, RuntimeFacade};
use hax_dispatcher::{command_queue, CommandProducer, Dispatcher, DispatcherHandle};
use hax_infrastructure::{
    ConsulCoordinationClient, DetachedRuntime, LoggingCoordinationClient, LoggingEventPublisher,
    RedisEventPublisher,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::shutdown::ShutdownSignal;

/// 主应用程序
///
/// 持有命令队列的生产端和尚未启动的分发器。`run` 启动分发线程和HTTP接入层，
/// 收到关闭信号后先停止接入层，再停止分发器并等待队列清空。
pub struct Application {
    config: AppConfig,
    producer: CommandProducer,
    dispatcher: Dispatcher,
}

impl Application {
    /// 创建新的应用实例
    pub fn new(config: AppConfig, dry_run: bool) -> Result<Self> {
        info!("初始化应用程序{}", if dry_run { " (dry-run)" } else { "" });

        // 未链接原生后端，运行时始终使用分离实现
        let runtime: Arc<dyn RuntimeFacade> = Arc::new(DetachedRuntime::new());

        let (coordination, publisher): (Arc<dyn CoordinationClient>, Arc<dyn EventPublisher>) =
            if dry_run {
                (
                    Arc::new(LoggingCoordinationClient),
                    Arc::new(LoggingEventPublisher::default()),
                )
            } else {
                (
                    Arc::new(ConsulCoordinationClient::new(&config.consul)),
                    Arc::new(create_event_publisher(&config)?),
                )
            };

        Ok(Self::with_collaborators(config, runtime, coordination, publisher))
    }

    /// 使用给定的后端运行时、协调存储和事件发布器组装应用
    pub fn with_collaborators(
        config: AppConfig,
        runtime: Arc<dyn RuntimeFacade>,
        coordination: Arc<dyn CoordinationClient>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let (producer, consumer) = command_queue();
        let dispatcher = Dispatcher::new(consumer, runtime, coordination, publisher)
            .with_config(&config.dispatcher, &config.retry);

        Self {
            config,
            producer,
            dispatcher,
        }
    }

    /// 命令队列的生产端
    pub fn producer(&self) -> CommandProducer {
        self.producer.clone()
    }

    /// 运行应用程序直到收到关闭信号
    ///
    /// 关闭时等待分发线程处理完所有已入队命令，没有超时；
    /// 仍在重试的命令会一直阻塞退出。
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<()> {
        let Self {
            config,
            producer,
            dispatcher,
        } = self;

        let state = AppState {
            producer: producer.clone(),
            stats: dispatcher.stats(),
            dispatcher: dispatcher.stop_handle(),
            reply_timeout: Duration::from_secs(config.api.reply_timeout_seconds),
        };

        let handle = dispatcher.spawn().context("启动分发线程失败")?;
        info!("分发线程已启动: {}", config.dispatcher.thread_name);

        let api_handle = if config.api.enabled {
            let listener = TcpListener::bind(&config.api.bind_address)
                .await
                .with_context(|| format!("绑定地址失败: {}", config.api.bind_address))?;
            info!("API服务器启动在 http://{}", config.api.bind_address);

            let app = create_app(state);
            let api_shutdown = shutdown.clone();
            Some(tokio::spawn(async move {
                let server = axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(api_shutdown.wait());
                if let Err(e) = server.await {
                    error!("API服务器运行失败: {}", e);
                }
            }))
        } else {
            info!("API服务器已禁用");
            drop(state);
            None
        };

        shutdown.wait().await;
        info!("应用程序收到关闭信号");

        if let Some(api_handle) = api_handle {
            if let Err(e) = api_handle.await {
                warn!("API服务器任务异常结束: {}", e);
            }
            info!("API服务器已停止");
        }

        let pending = producer.pending();
        if pending > 0 {
            info!("等待分发线程处理剩余 {} 条命令", pending);
        }
        stop_dispatcher(handle).await
    }
}

/// 停止分发器并等待分发线程退出
async fn stop_dispatcher(handle: DispatcherHandle) -> Result<()> {
    handle.stop();
    let stats = handle.stats();

    tokio::task::spawn_blocking(move || handle.join())
        .await
        .context("等待分发线程失败")?
        .context("分发线程异常退出")?;

    let snapshot = stats.snapshot();
    info!(
        "分发器已停止: 处理 {} 条，失败 {} 条，panic {} 次",
        snapshot.handled, snapshot.failed, snapshot.panicked
    );
    Ok(())
}

/// 创建事件发布器，连接延迟到第一次发布
fn create_event_publisher(config: &AppConfig) -> Result<RedisEventPublisher> {
    let publisher =
        RedisEventPublisher::new(&config.event_queue).context("创建Redis事件发布器失败")?;

    if let Err(e) = publisher.ping() {
        warn!(
            "Redis暂不可用 ({}): {}，将在发布时重连",
            config.event_queue.redis_url, e
        );
    }

    Ok(publisher)
}
