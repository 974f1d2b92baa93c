use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use hax_core::{Command, HaxError, HaxResult};

/// 创建命令队列，返回可克隆的生产端和唯一的消费端
pub fn command_queue() -> (CommandProducer, CommandConsumer) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));

    (
        CommandProducer {
            sender,
            pending: Arc::clone(&pending),
        },
        CommandConsumer { receiver, pending },
    )
}

/// 命令队列的生产端
///
/// 可以在任意线程或异步任务中使用，入队从不阻塞。
#[derive(Debug, Clone)]
pub struct CommandProducer {
    sender: mpsc::UnboundedSender<Command>,
    pending: Arc<AtomicUsize>,
}

impl CommandProducer {
    /// 命令入队；消费端关闭后返回 `QueueClosed`
    pub fn enqueue(&self, command: Command) -> HaxResult<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);

        match self.sender.send(command) {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(command)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                debug!("命令队列已关闭，丢弃命令: {}", command.kind());
                Err(HaxError::QueueClosed)
            }
        }
    }

    /// 尚未被取出的命令数量
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// 命令队列的消费端，只由分发线程持有
#[derive(Debug)]
pub struct CommandConsumer {
    receiver: mpsc::UnboundedReceiver<Command>,
    pending: Arc<AtomicUsize>,
}

impl CommandConsumer {
    /// 非阻塞地取出最早入队的命令
    pub fn try_dequeue(&mut self) -> Option<Command> {
        match self.receiver.try_recv() {
            Ok(command) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                Some(command)
            }
            Err(_) => None,
        }
    }

    /// 拒绝后续入队，已入队的命令仍可取出
    pub fn close(&mut self) {
        self.receiver.close();
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
