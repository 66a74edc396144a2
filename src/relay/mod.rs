//! Relay Module
//!
//! Executes a route on this node and forwards child routes downstream.

mod destination;
mod executor;
mod model;

pub use destination::{Destination, HttpDestination};
pub use executor::RouteExecutor;
pub use model::{ChildRoute, FaultSet, FaultSpec, Response, Route};

/// Correlation header carried from the inbound request to every forwarded call.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request data threaded through a single route execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
        }
    }
}
