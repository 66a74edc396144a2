//! Fault System Module
//!
//! Turns the `type`/`args` pairs carried on a route into executable faults.
//! The set of faults is closed: every tag this node understands maps to a
//! `FaultKind` variant, anything else is rejected when the fault is cast.

mod latency;
mod memory_leak;

pub use latency::Latency;
pub use memory_leak::MemoryLeak;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{FaultError, FaultResult};
use crate::relay::FaultSpec;

/// A synthetic disruption that can be injected into the request path.
#[async_trait]
pub trait Fault: Send + Sync {
    /// Tag the fault is registered under
    fn name(&self) -> &'static str;

    /// Resolves once the fault's effect on the caller is complete
    async fn run(&self) -> FaultResult<()>;
}

/// Every fault this node can inject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    Latency(Latency),
    MemoryLeak(MemoryLeak),
}

impl FaultKind {
    /// Build an executable fault from its wire form.
    pub fn cast(spec: &FaultSpec) -> FaultResult<Self> {
        match spec.kind.as_str() {
            "latency" => Ok(FaultKind::Latency(parse_args("latency", &spec.args)?)),
            "memory-leak" | "memory_leak" | "memory-pressure" => {
                Ok(FaultKind::MemoryLeak(MemoryLeak::from_args(&spec.args)?))
            }
            "" => Err(FaultError::MissingFaultType),
            other => Err(FaultError::UnknownFaultType(other.to_string())),
        }
    }
}

#[async_trait]
impl Fault for FaultKind {
    fn name(&self) -> &'static str {
        match self {
            FaultKind::Latency(f) => f.name(),
            FaultKind::MemoryLeak(f) => f.name(),
        }
    }

    async fn run(&self) -> FaultResult<()> {
        match self {
            FaultKind::Latency(f) => f.run().await,
            FaultKind::MemoryLeak(f) => f.run().await,
        }
    }
}

/// Cast a wire fault and run it to completion.
pub async fn cast_and_execute(spec: &FaultSpec) -> FaultResult<()> {
    let fault = FaultKind::cast(spec)?;
    debug!("running {} fault", fault.name());
    fault.run().await
}

fn parse_args<T: DeserializeOwned>(fault: &str, args: &Value) -> FaultResult<T> {
    serde_json::from_value(args.clone()).map_err(|e| FaultError::InvalidFaultArgs {
        fault: fault.to_string(),
        reason: e.to_string(),
    })
}
