//! Catch-all handlers that hand requests to the proxy forwarders.

use axum::extract::{Request, State};
use axum::response::Response;

use crate::error::AppResult;
use crate::state::AppState;

/// ANY /api/v1/gateway/*
pub async fn gateway(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    state.forwarders.gateway.forward(request).await
}

/// ANY /api/v1/reports/*
pub async fn reports(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    state.forwarders.reports.forward(request).await
}

/// ANY /api/v1/files/*
pub async fn files(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    state.forwarders.files.forward(request).await
}
