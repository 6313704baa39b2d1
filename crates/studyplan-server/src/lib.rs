//! # studyplan-server
//!
//! HTTP transport for the studyplan optimizer.
//!
//! | Route | Body | Response |
//! |-------|------|----------|
//! | `POST /optimize` | request JSON | `[{id, start, end}]`, `[]` when no plan exists |
//! | `POST /optimize/detailed` | request JSON | `{status, objective, entries}` |
//! | `GET /health` | | `ok` |
//!
//! Structurally invalid requests are answered with `422` and
//! `{"error": message}`. Solving runs on the blocking thread pool.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use studyplan_core::{PlanOutcome, PlannedTask, Planner, ScheduleRequest, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<dyn Planner>,
}

impl AppState {
    pub fn new(planner: impl Planner + 'static) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/optimize/detailed", post(optimize_detailed))
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationError),
    /// The solve task panicked or was cancelled
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Invalid(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn run_plan(state: &AppState, request: ScheduleRequest) -> Result<PlanOutcome, ApiError> {
    tracing::debug!(
        tasks = request.tasks.len(),
        fixed_blocks = request.fixed_blocks.len(),
        blocked_days = request.blocked_days.len(),
        preference_time = request.preference_time.as_deref().unwrap_or(""),
        "optimize request received"
    );
    let planner = Arc::clone(&state.planner);
    let outcome = tokio::task::spawn_blocking(move || planner.plan(&request))
        .await
        .map_err(|e| ApiError::Internal(format!("solver task failed: {}", e)))?;

    outcome.map_err(|e| {
        tracing::info!(error = %e, "rejecting invalid request");
        ApiError::Invalid(e)
    })
}

pub async fn optimize(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<Vec<PlannedTask>>, ApiError> {
    let entries = run_plan(&state, request).await?.into_entries();
    tracing::debug!(entries = entries.len(), "returning plan");
    Ok(Json(entries))
}

pub async fn optimize_detailed(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<PlanOutcome>, ApiError> {
    let outcome = run_plan(&state, request).await?;
    tracing::debug!(status = %outcome.status, entries = outcome.entries.len(), "returning outcome");
    Ok(Json(outcome))
}
