use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

/// 进程级关闭开关
///
/// 只能从未关闭翻转为已关闭一次。HTTP接入层和分发器各自持有一个
/// [`ShutdownSignal`]，关闭之后才订阅的一方也会立即看到已关闭状态。
#[derive(Clone)]
pub struct ShutdownManager {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// 触发关闭，重复调用无效果
    pub fn shutdown(&self) {
        let flipped = self.tx.send_if_modified(|closed| !std::mem::replace(closed, true));
        if flipped {
            info!("触发系统关闭，通知 {} 个订阅者", self.tx.receiver_count());
        } else {
            debug!("关闭已经触发过");
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 关闭通知的接收端
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// 等到关闭被触发；开关本身被丢弃也视为关闭
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}
