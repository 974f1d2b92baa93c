//! Test container utilities for integration testing
//!
//! Requires a local Docker daemon; tests using it are marked `#[ignore]`.

use anyhow::Result;
use testcontainers::ContainerAsync;
use testcontainers::{runners::AsyncRunner, ImageExt};
use testcontainers_modules::redis::Redis;

/// Redis test container backing the stream event publisher
pub struct RedisTestContainer {
    #[allow(dead_code)]
    container: ContainerAsync<Redis>,
    pub url: String,
}

impl RedisTestContainer {
    pub async fn new() -> Result<Self> {
        let container = Redis::default().with_tag("7-alpine").start().await?;
        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;

        Ok(Self {
            container,
            url: format!("redis://{host}:{port}"),
        })
    }
}
