//! Memory pressure fault.
//!
//! `run` returns as soon as the hold is scheduled. The allocation, the hold
//! and the release all happen on a background task that outlives the fault,
//! so concurrent faults stack up. Nothing tracks or bounds them.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::Fault;
use crate::error::{FaultError, FaultResult};

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, Deserialize)]
struct MemoryLeakArgs {
    /// Megabytes to hold.
    size: u64,
    /// Milliseconds to hold them for.
    duration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLeak {
    size_mib: u64,
    bytes: usize,
    hold: Duration,
}

impl MemoryLeak {
    pub fn new(size_mib: u64, duration_ms: u64) -> FaultResult<Self> {
        let bytes = size_mib
            .checked_mul(MIB)
            .and_then(|b| usize::try_from(b).ok())
            .ok_or_else(|| FaultError::InvalidFaultArgs {
                fault: "memory-leak".to_string(),
                reason: format!("size of {}MB does not fit in addressable memory", size_mib),
            })?;

        Ok(Self {
            size_mib,
            bytes,
            hold: Duration::from_millis(duration_ms),
        })
    }

    pub(super) fn from_args(args: &serde_json::Value) -> FaultResult<Self> {
        let args: MemoryLeakArgs = super::parse_args("memory-leak", args)?;
        Self::new(args.size, args.duration)
    }

    pub fn size_mib(&self) -> u64 {
        self.size_mib
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Starts the background hold and hands back its handle. `run` drops the
    /// handle; tests await it to observe the release.
    ///
    /// Fails when called outside a tokio runtime, since there is nothing to
    /// host the hold.
    pub fn spawn_hold(&self) -> FaultResult<JoinHandle<()>> {
        let Self { size_mib, bytes, hold } = *self;
        let runtime = Handle::try_current().map_err(|e| FaultError::FaultExecution {
            fault: "memory-leak".to_string(),
            reason: e.to_string(),
        })?;

        Ok(runtime.spawn(async move {
            info!("creating memory leak of {}MB for {}ms", size_mib, hold.as_millis());

            let filled = tokio::task::spawn_blocking(move || fill(bytes)).await;
            let leak = match filled {
                Ok(Ok(leak)) => leak,
                Ok(Err(e)) => {
                    error!("memory leak of {}MB could not be allocated: {}", size_mib, e);
                    return;
                }
                Err(e) => {
                    error!("memory leak allocation task failed: {}", e);
                    return;
                }
            };

            tokio::time::sleep(hold).await;
            drop(leak);
            info!("memory leak of {}MB was released", size_mib);
        }))
    }
}

fn fill(bytes: usize) -> Result<Vec<u8>, std::collections::TryReserveError> {
    let mut leak = Vec::new();
    leak.try_reserve_exact(bytes)?;
    // Touch every page so the hold is resident, not just reserved.
    leak.resize(bytes, b'a');
    Ok(leak)
}

#[async_trait]
impl Fault for MemoryLeak {
    fn name(&self) -> &'static str {
        "memory-leak"
    }

    async fn run(&self) -> FaultResult<()> {
        drop(self.spawn_hold()?);
        Ok(())
    }
}
