//! Outbound calls to downstream relay nodes.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::error::Error as _;
use std::time::Duration;
use tracing::debug;

use super::{RequestContext, Response, Route, REQUEST_ID_HEADER};
use crate::error::{ForwardError, ForwardResult};

/// Longest slice of a rejected body kept in the error message.
const BODY_EXCERPT_LEN: usize = 256;

/// Something a child route can be forwarded to.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Send `route` to `route.designation` and return the node's reply.
    async fn call(&self, route: &Route, ctx: &RequestContext) -> ForwardResult<Response>;
}

/// Forwards routes over HTTP as JSON.
pub struct HttpDestination {
    client: Client,
}

impl HttpDestination {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// A `None` timeout leaves calls unbounded.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().unwrap_or_default(),
        }
    }
}

impl Default for HttpDestination {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Destination for HttpDestination {
    async fn call(&self, route: &Route, ctx: &RequestContext) -> ForwardResult<Response> {
        let designation = route.designation.clone();
        debug!("forwarding to {}", designation);

        let mut request = self
            .client
            .post(&route.designation)
            .header(ACCEPT, "application/json")
            .json(route);
        if let Some(id) = &ctx.request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let res = request.send().await.map_err(|e| ForwardError::DestinationUnreachable {
            designation: designation.clone(),
            reason: describe(&e),
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| ForwardError::DestinationUnreachable {
            designation: designation.clone(),
            reason: describe(&e),
        })?;

        if !status.is_success() {
            return Err(ForwardError::DestinationRejected {
                designation,
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ForwardError::ResponseParse {
            designation,
            reason: e.to_string(),
        })
    }
}

// reqwest's top-level message hides the cause (refused, dns, timeout).
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(BODY_EXCERPT_LEN + 10);
        let short = excerpt(&long);
        assert_eq!(short.len(), BODY_EXCERPT_LEN + 3);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("  bad gateway \n"), "bad gateway");
    }

    #[tokio::test]
    async fn test_invalid_designation_is_unreachable() {
        let destination = HttpDestination::new();
        let err = destination
            .call(&Route::new("not a url"), &RequestContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardError::DestinationUnreachable { ref designation, .. } if designation == "not a url"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let destination = HttpDestination::with_timeout(Some(Duration::from_secs(2)));
        let err = destination
            .call(&Route::new(format!("http://{}/", addr)), &RequestContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardError::DestinationUnreachable { .. }));
    }
}
