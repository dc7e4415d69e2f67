//! Body extractor accepting JSON or form-urlencoded payloads
//!
//! The bundled page posts JSON via `fetch`, while the listing page's remove
//! buttons submit plain HTML forms. Both land on the same handlers.

use crate::error::AppError;
use axum::{
    Form, Json,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection},
    },
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

/// Deserializes the body as JSON when the request says so, as a form otherwise
///
/// Rejections become `AppError::BadRequest` so clients get the same
/// `{ok: false, error}` shape as every other 400.
pub struct JsonOrForm<T>(pub T);

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or("").trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| JsonOrForm(value))
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| JsonOrForm(value))
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
        }
    }
}
