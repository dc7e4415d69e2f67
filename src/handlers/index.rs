//! Entry page

use axum::{extract::State, response::Html};
use std::borrow::Cow;

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::metrics::Counter;

/// Page served when `assets.index_path` is not configured
pub const DEFAULT_INDEX_PAGE: &str = include_str!("../../views/index.html");

/// GET /
///
/// Counts the view before reading the page, so a missing custom page still
/// shows up as traffic.
pub async fn handler(State(state): State<AppState>) -> AppResult<Html<Cow<'static, str>>> {
    state.metrics().increment(Counter::PageViews);

    let Some(path) = &state.config().assets.index_path else {
        return Ok(Html(Cow::Borrowed(DEFAULT_INDEX_PAGE)));
    };

    let page = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Asset {
            path: path.clone(),
            source,
        })?;
    Ok(Html(Cow::Owned(page)))
}
