//! HTTP boundary: accepts routes on `POST /` and replies with the executed tree.

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Router,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::relay::{HttpDestination, RequestContext, Response, Route, RouteExecutor, REQUEST_ID_HEADER};

pub struct RelayState {
    pub executor: RouteExecutor,
}

impl RelayState {
    pub fn new(executor: RouteExecutor) -> Self {
        Self { executor }
    }

    /// State wired to real HTTP destinations.
    pub fn from_config(config: &RelayConfig) -> Self {
        let destination = Arc::new(HttpDestination::with_timeout(config.forward_timeout));
        Self::new(RouteExecutor::new(config.service_name.clone(), destination))
    }
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", post(relay_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the relay on an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<RelayState>) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run_relay_server(config: RelayConfig) -> Result<()> {
    info!("🔀 Starting relay node '{}'...", config.service_name);

    let state = Arc::new(RelayState::from_config(&config));
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 Relay node '{}' listening at http://{}", config.service_name, addr);

    serve(listener, state).await
}

async fn relay_handler(
    State(state): State<Arc<RelayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> HttpResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let route: Route = match serde_json::from_slice(&body).map_err(RelayError::from) {
        Ok(route) => route,
        Err(e) => {
            warn!("RequestID={}, rejected payload: {}", request_id, e);
            let mut reply = Response::new(state.executor.service_name(), "");
            reply.errors.push(e.to_string());
            return (
                StatusCode::BAD_REQUEST,
                [(REQUEST_ID_HEADER, request_id)],
                Json(reply),
            )
                .into_response();
        }
    };

    let ctx = RequestContext::new(request_id.clone());
    let reply = state.executor.execute(&route, &ctx).await;

    info!(
        "RequestID={}, Response={}",
        request_id,
        serde_json::to_string(&reply).unwrap_or_default()
    );

    (StatusCode::OK, [(REQUEST_ID_HEADER, request_id)], Json(reply)).into_response()
}
