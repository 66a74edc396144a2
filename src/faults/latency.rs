//! Latency fault: holds the request path for a fixed delay.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::Fault;
use crate::error::FaultResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Latency {
    /// Delay in milliseconds.
    pub delay: u64,
}

impl Latency {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay: delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }
}

#[async_trait]
impl Fault for Latency {
    fn name(&self) -> &'static str {
        "latency"
    }

    async fn run(&self) -> FaultResult<()> {
        debug!("injecting {}ms of latency", self.delay);
        tokio::time::sleep(self.delay()).await;
        Ok(())
    }
}
