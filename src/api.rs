//! HTTP API for the tax engine.
//!
//! This module exposes a minimal REST API around the calculation
//! service using the [`axum`](https://crates.io/crates/axum) framework.
//! Request bodies are parsed and validated here; only well-formed input
//! reaches the engine.  Bodies are read as JSON whatever their
//! `Content-Type` header says.

use crate::config::Config;
use crate::engine::TaxService;
use crate::models::{Scenario, TaxCalculationRequest, TaxCalculationResponse, ValidationError};
use crate::scenarios::scenarios;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Application state shared across requests.
#[derive(Debug, Default)]
pub struct AppState {
    pub service: TaxService,
}

impl AppState {
    pub fn new(service: TaxService) -> Self {
        Self { service }
    }
}

/// Errors surfaced to HTTP clients.  All of them are the caller's fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("Invalid request body: {0}")]
    Invalid(#[from] ValidationError),
    #[error("Invalid request body: request {index}: {source}")]
    InvalidBatchItem { index: usize, source: ValidationError },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejected request");
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/api/tax/calculate", post(calculate_handler))
        .route("/api/tax/calculate/batch", post(batch_handler))
        .route("/api/tax/scenarios", get(scenarios_handler))
        .with_state(state)
}

/// Handler for GET /ping
pub async fn ping_handler() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Handler for POST /api/tax/calculate
pub async fn calculate_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TaxCalculationResponse>, ApiError> {
    let request: TaxCalculationRequest = parse_body(&body)?;
    request.validate()?;
    let response = app_state.service.calculate_tax(&request);
    info!(
        incomes = request.incomes.len(),
        deductions = request.deductions.len(),
        annual_tax = response.breakdown.annual_tax,
        "calculated tax"
    );
    Ok(Json(response))
}

/// Handler for POST /api/tax/calculate/batch
pub async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<TaxCalculationResponse>>, ApiError> {
    let requests: Vec<TaxCalculationRequest> = parse_body(&body)?;
    for (index, request) in requests.iter().enumerate() {
        request
            .validate()
            .map_err(|source| ApiError::InvalidBatchItem { index, source })?;
    }
    let responses = app_state.service.calculate_batch(&requests);
    info!(requests = responses.len(), "calculated tax batch");
    Ok(Json(responses))
}

/// Handler for GET /api/tax/scenarios
pub async fn scenarios_handler() -> Json<Vec<Scenario>> {
    Json(scenarios())
}

/// Launch the API server on the configured address.  Runs until the
/// server terminates.
pub async fn serve(config: Config) -> Result<()> {
    let router = build_router(Arc::new(AppState::default()));
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await.context("serving HTTP")
}
