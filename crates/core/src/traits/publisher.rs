use crate::HaxResult;

/// 存储I/O队列故障事件的主题
pub const STOB_IOQ_TOPIC: &str = "stob-ioq";

/// 事件日志发布器
pub trait EventPublisher: Send + Sync {
    /// 发布载荷到指定主题，返回事件在日志中的偏移
    fn publish(&self, topic: &str, payload: &[u8]) -> HaxResult<String>;
}
