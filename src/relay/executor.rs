//! Route execution for a single node.
//!
//! Each step runs to completion before the next one starts: before faults,
//! then every child route in order, then after faults. A failing fault or
//! child is recorded on the reply and execution moves on, so a route always
//! produces a `Response`.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ChildRoute, Destination, FaultSpec, RequestContext, Response, Route};
use crate::error::{ForwardError, ForwardResult};
use crate::faults;

pub struct RouteExecutor {
    service_name: String,
    destination: Arc<dyn Destination>,
}

impl RouteExecutor {
    pub fn new(service_name: impl Into<String>, destination: Arc<dyn Destination>) -> Self {
        Self {
            service_name: service_name.into(),
            destination,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Run `route` on this node. `reply.response` always has exactly one slot
    /// per child route, `None` where forwarding failed.
    pub async fn execute(&self, route: &Route, ctx: &RequestContext) -> Response {
        let mut reply = Response::new(&self.service_name, &route.designation);

        self.run_faults("before", &route.faults.before, &mut reply.errors).await;

        for child in route.children() {
            match self.forward(child, ctx).await {
                Ok(child_reply) => reply.response.push(Some(child_reply)),
                Err(e) => {
                    warn!("error while forwarding request to {}: {}", child.designation(), e);
                    reply.errors.push(e.to_string());
                    reply.response.push(None);
                }
            }
        }

        self.run_faults("after", &route.faults.after, &mut reply.errors).await;

        info!(
            "route {} done: {} children, {} errors",
            route.designation,
            reply.response.len(),
            reply.errors.len()
        );
        reply
    }

    async fn forward(&self, child: &ChildRoute, ctx: &RequestContext) -> ForwardResult<Response> {
        match child {
            ChildRoute::Valid(route) => self.destination.call(route, ctx).await,
            ChildRoute::Invalid { reason, .. } => Err(ForwardError::InvalidRoute {
                designation: child.designation().to_string(),
                reason: reason.clone(),
            }),
        }
    }

    async fn run_faults(&self, stage: &str, specs: &[FaultSpec], errors: &mut Vec<String>) {
        for spec in specs {
            debug!("{} fault: {}", stage, spec.kind);
            if let Err(e) = faults::cast_and_execute(spec).await {
                warn!("{} fault {} failed: {}", stage, spec.kind, e);
                errors.push(e.to_string());
            }
        }
    }
}
