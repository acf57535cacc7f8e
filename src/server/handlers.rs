use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::attractions::{Attraction, AttractionPipeline, AttractionsReport, PipelineError};
use crate::selection::{Neighborhood, SelectionError};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

/// Failure of a request, rendered as `{error, code}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        let status = if err.is_retryable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Selection(e) => e.into(),
            lookup @ PipelineError::Lookup { .. } => Self::new(StatusCode::INTERNAL_SERVER_ERROR, lookup.to_string()),
        }
    }
}

/// Keeps axum's status (400 for bad syntax, 415, 422) but uses our body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

// ─── POST /attractions ───────────────────────────────────────────

pub async fn attractions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<Attraction>>, JsonRejection>,
) -> Result<(StatusCode, Json<AttractionsReport>), ApiError> {
    let Json(attractions) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "POST /attractions rejected");
        ApiError::from(rejection)
    })?;
    let start = Instant::now();
    let count = attractions.len();

    // Geocoding and lookups block; keep them off the async workers.
    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        let pipeline = AttractionPipeline::new(worker.geocoder.as_ref(), &worker.store, &worker.distance);
        pipeline.run(attractions)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "attraction worker panicked");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "attraction worker failed")
    })?;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    match outcome {
        Ok(report) => {
            info!(
                attractions = count,
                closest = ?report.closest_neighborhood.as_ref().map(|n| n.name.as_str()),
                elapsed_ms,
                "POST /attractions"
            );
            Ok((StatusCode::CREATED, Json(report)))
        }
        Err(e) => {
            warn!(attractions = count, error = %e, elapsed_ms, "POST /attractions failed");
            Err(e.into())
        }
    }
}

// ─── GET /neighborhoods ──────────────────────────────────────────

pub async fn neighborhoods(State(state): State<Arc<AppState>>) -> Json<Vec<Neighborhood>> {
    Json(state.store.neighborhoods())
}

// ─── GET /health ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    neighborhoods: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        neighborhoods: state.store.len(),
    })
}
