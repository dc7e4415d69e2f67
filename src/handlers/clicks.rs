//! Click tracking endpoint
//!
//! The entry page reports button clicks here. The optional event name is
//! logged only; it never becomes a metric label.

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};

use crate::handlers::AppState;
use crate::metrics::Counter;

/// Optional click payload sent by the page script
#[derive(Debug, Default, Deserialize)]
pub struct ClickEvent {
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub ok: bool,
    pub message: &'static str,
}

/// POST /registrar-clique
pub async fn handler(State(state): State<AppState>, body: Bytes) -> Json<ClickResponse> {
    state.metrics().increment(Counter::Clicks);

    let event = if body.iter().all(u8::is_ascii_whitespace) {
        ClickEvent::default()
    } else {
        serde_json::from_slice::<ClickEvent>(&body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring unparsable click payload");
            ClickEvent::default()
        })
    };

    tracing::debug!(
        event = event.event.as_deref().unwrap_or("unspecified"),
        "Click recorded"
    );

    Json(ClickResponse {
        ok: true,
        message: "click recorded",
    })
}
