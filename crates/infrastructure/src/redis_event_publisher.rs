//! Redis Stream 事件发布器
//!
//! 每个主题对应一个 stream，载荷写入 `payload` 字段：
//!
//! ```text
//! XADD <topic> MAXLEN ~ <max_stream_length> * payload <bytes>
//! ```
//!
//! 连接在首次发布时建立，命令失败后丢弃，下一次发布时重连。

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use redis::{Client, Connection};
use tracing::{debug, info, warn};

use hax_config::EventQueueConfig;
use hax_core::{EventPublisher, HaxError, HaxResult};

pub struct RedisEventPublisher {
    client: Client,
    config: EventQueueConfig,
    connection: Mutex<Option<Connection>>,
}

impl RedisEventPublisher {
    pub fn new(config: &EventQueueConfig) -> HaxResult<Self> {
        let client = Client::open(config.redis_url.as_str())
            .map_err(|e| HaxError::publish(format!("创建Redis客户端失败: {e}")))?;

        info!(
            "创建Redis Stream事件发布器: {} (maxlen ~{})",
            config.redis_url, config.max_stream_length
        );

        Ok(Self {
            client,
            config: config.clone(),
            connection: Mutex::new(None),
        })
    }

    fn connect(&self) -> HaxResult<Connection> {
        let start = Instant::now();
        let connection = self
            .client
            .get_connection_with_timeout(Duration::from_secs(
                self.config.connection_timeout_seconds,
            ))
            .map_err(|e| {
                counter!("hax_event_publisher_connection_errors_total").increment(1);
                HaxError::publish(format!("连接Redis失败: {e}"))
            })?;

        debug!(
            "已连接Redis {}，耗时 {:?}",
            self.config.redis_url,
            start.elapsed()
        );
        Ok(connection)
    }

    /// 检查Redis是否可用
    pub fn ping(&self) -> HaxResult<()> {
        let mut slot = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.connect()?,
        };

        let _: String = redis::cmd("PING")
            .query(&mut connection)
            .map_err(|e| HaxError::publish(format!("Redis PING失败: {e}")))?;

        *slot = Some(connection);
        Ok(())
    }
}

impl EventPublisher for RedisEventPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> HaxResult<String> {
        let start = Instant::now();
        let mut slot = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.connect()?,
        };

        let entry_id: String = redis::cmd("XADD")
            .arg(topic)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.config.max_stream_length)
            .arg("*")
            .arg("payload")
            .arg(payload)
            .query(&mut connection)
            .map_err(|e| {
                warn!("写入stream {} 失败，下次发布时重连: {}", topic, e);
                counter!("hax_event_publisher_errors_total", "topic" => topic.to_owned())
                    .increment(1);
                HaxError::publish(format!("写入Redis Stream {topic} 失败: {e}"))
            })?;

        *slot = Some(connection);

        histogram!("hax_event_publisher_duration_ms").record(start.elapsed().as_millis() as f64);
        counter!("hax_event_publisher_events_total", "topic" => topic.to_owned()).increment(1);
        debug!("已发布 {} 字节到 {}: {}", payload.len(), topic, entry_id);

        Ok(entry_id)
    }
}
