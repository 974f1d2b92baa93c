use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use hax::app::Application;
use hax::common::{init_logging, install_metrics_exporter, wait_for_shutdown_signal};
use hax::shutdown::ShutdownManager;
use hax_config::{AppConfig, OutputFormat};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("hax")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HA 命令分发服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时依次查找默认位置"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "text", "pretty"]),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("不访问Consul和Redis，所有外部调用只写日志")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config");
    let dry_run = matches.get_flag("dry-run");

    let config = AppConfig::load(config_path.map(String::as_str))
        .with_context(|| format!("加载配置失败: {}", config_path.map_or("<默认>", String::as_str)))?;

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.observability.log_level.to_string());
    let log_format = match matches.get_one::<String>("log-format") {
        Some(format) => format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!("{e}"))?,
        None => config.observability.log_format,
    };
    init_logging(&log_level, log_format)?;

    info!("启动HA命令分发服务");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    install_metrics_exporter(&config.observability)?;

    let app = Application::new(config, dry_run)?;
    let shutdown_manager = ShutdownManager::new();

    let app_handle = {
        let shutdown = shutdown_manager.subscribe();
        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown).await {
                error!("应用运行失败: {e:#}");
            }
        })
    };

    wait_for_shutdown_signal().await;
    info!("收到关闭信号，开始优雅关闭...");

    shutdown_manager.shutdown();

    // 分发线程清空队列后才会返回，重试中的命令会推迟退出
    match app_handle.await {
        Ok(()) => info!("应用已优雅关闭"),
        Err(e) => error!("应用关闭时发生错误: {e}"),
    }

    info!("HA命令分发服务已退出");
    Ok(())
}
