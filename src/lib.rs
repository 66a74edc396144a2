//! Fault-Injecting Request Relay
//!
//! A node for building call graphs that misbehave on purpose:
//! - Runs latency and memory-pressure faults before and after forwarding
//! - Forwards child routes to downstream nodes over HTTP
//! - Aggregates replies into a tree that records partial failures
//!   instead of failing the whole request

pub mod config;
pub mod error;
pub mod faults;
pub mod relay;
pub mod server;
pub mod utils;

// Re-exports for convenience
pub use config::RelayConfig;
pub use relay::{Response, Route, RouteExecutor};
pub use server::run_relay_server;
