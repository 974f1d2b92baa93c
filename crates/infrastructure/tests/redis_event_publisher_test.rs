use anyhow::Result;
use redis::Commands;

use hax_config::EventQueueConfig;
use hax_core::{EventPublisher, Fid, STOB_IOQ_TOPIC};
use hax_infrastructure::RedisEventPublisher;
use hax_testing_utils::{RedisTestContainer, StobIoqErrorBuilder};

#[tokio::test]
#[ignore] // Requires Docker for the Redis container
async fn test_publish_stob_ioq_error_to_stream() -> Result<()> {
    let redis = RedisTestContainer::new().await?;
    let config = EventQueueConfig {
        redis_url: redis.url.clone(),
        max_stream_length: 1000,
        ..EventQueueConfig::default()
    };
    let report = StobIoqErrorBuilder::new(Fid::new(0x7200000000000001, 0x2))
        .with_rc(-28)
        .build();
    let payload = report.to_payload()?;

    let url = redis.url.clone();
    let (first, second, entries) = tokio::task::spawn_blocking(move || -> Result<_> {
        let publisher = RedisEventPublisher::new(&config)?;
        publisher.ping()?;
        let first = publisher.publish(STOB_IOQ_TOPIC, &payload)?;
        let second = publisher.publish(STOB_IOQ_TOPIC, &payload)?;

        let mut connection = redis::Client::open(url)?.get_connection()?;
        let entries: redis::streams::StreamRangeReply =
            connection.xrange_all(STOB_IOQ_TOPIC)?;
        Ok((first, second, entries))
    })
    .await??;

    assert_ne!(first, second);
    assert_eq!(entries.ids.len(), 2);
    assert_eq!(entries.ids[0].id, first);

    let stored: Vec<u8> = entries.ids[0]
        .get("payload")
        .expect("payload field");
    let value: serde_json::Value = serde_json::from_slice(&stored)?;
    assert_eq!(value["fid"], "0x7200000000000001:0x2");
    assert_eq!(value["rc"], -28);

    Ok(())
}
