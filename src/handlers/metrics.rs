//! Prometheus metrics endpoint
//!
//! Exposes metrics in Prometheus text format for scraping.

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;

/// Metrics handler for Prometheus scraping
///
/// # Response
///
/// - `200 OK` with metrics in Prometheus text format
/// - `500 Internal Server Error` if metrics collection fails
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/metrics
/// # HELP roster_page_views_total Total number of entry page requests
/// # TYPE roster_page_views_total counter
/// roster_page_views_total 42
/// ```
pub async fn handler(State(state): State<AppState>) -> AppResult<Response> {
    let metrics = state.metrics();
    let output = metrics.gather().map_err(|e| {
        tracing::error!(
            error = %e,
            "Failed to gather metrics for Prometheus scraping"
        );
        AppError::Metrics(e)
    })?;

    Ok(([(CONTENT_TYPE, metrics.content_type())], output).into_response())
}
