//! Record endpoints: save, list, remove
//!
//! Handlers validate, delegate to the [`RecordStore`](crate::records::RecordStore)
//! and count what happened. Storage failures are returned as 500s, never
//! swallowed.

use axum::{
    Json,
    extract::State,
    response::{Html, Redirect},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, StoreError};
use crate::handlers::AppState;
use crate::handlers::extract::JsonOrForm;
use crate::handlers::render;
use crate::metrics::Counter;
use crate::records::validation::FieldValue;
use crate::records::{RawRecordInput, Record, RecordId, validate};

/// Successful save response
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub ok: bool,
    pub record: Record,
}

/// Remove request body
#[derive(Debug, Default, Deserialize)]
pub struct RemoveRequest {
    #[serde(default)]
    pub id: Option<FieldValue>,
}

impl RemoveRequest {
    /// Parse the id, distinguishing an absent id from a malformed one
    pub fn record_id(&self) -> AppResult<RecordId> {
        let text = match &self.id {
            Some(value) => value.as_text(),
            None => return Err(AppError::MissingParameter("id")),
        };
        if text.trim().is_empty() {
            return Err(AppError::MissingParameter("id"));
        }
        text.parse::<RecordId>()
            .map_err(|e| AppError::InvalidParameter {
                name: "id",
                reason: format!("'{}' is not a record id: {}", text.trim(), e),
            })
    }
}

fn storage_failure(state: &AppState, operation: &'static str, error: StoreError) -> AppError {
    state.metrics().increment(Counter::StoreWriteFailures);
    tracing::error!(
        operation,
        path = %state.store().path().display(),
        error = %error,
        "Record mutation failed to persist"
    );
    AppError::Store(error)
}

/// POST /salvar
pub async fn save(
    State(state): State<AppState>,
    JsonOrForm(input): JsonOrForm<RawRecordInput>,
) -> AppResult<Json<SaveResponse>> {
    let new_record = validate(&input).map_err(|errors| {
        state.metrics().increment(Counter::ValidationFailures);
        tracing::debug!(errors = %errors, "Rejected record submission");
        AppError::Validation(errors)
    })?;

    let (record, records) = state
        .store()
        .append(new_record)
        .await
        .map_err(|e| storage_failure(&state, "append", e))?;

    state.metrics().increment(Counter::RecordsCreated);
    state.metrics().set_stored_records(records.len());
    tracing::info!(id = %record.id, "Record saved");

    Ok(Json(SaveResponse { ok: true, record }))
}

/// GET /lista
///
/// A strict-mode read failure is a 500 but not a write failure, so it
/// leaves `StoreWriteFailures` alone.
pub async fn list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let records = state.store().load().await?;
    state.metrics().set_stored_records(records.len());
    Ok(Html(render::record_list(&records)))
}

/// POST /remover
pub async fn remove(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<RemoveRequest>,
) -> AppResult<Redirect> {
    let id = request.record_id()?;

    let (removed, records) = state
        .store()
        .remove(id)
        .await
        .map_err(|e| storage_failure(&state, "remove", e))?;

    state.metrics().set_stored_records(records.len());
    if !removed.is_empty() {
        state.metrics().increment(Counter::RecordsRemoved);
        tracing::info!(id = %id, count = removed.len(), "Record removed");
    }

    Ok(Redirect::to("/lista"))
}
