//! Leak control for error responses.
//!
//! [`AppError`](crate::error::AppError) always writes a sanitized body and
//! stashes the underlying cause in an [`ErrorDetail`] extension. This
//! middleware decides, once for the whole router, whether that cause is
//! appended to the body as `error`.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_LENGTH;
use axum::response::Response;
use serde_json::Value;

use crate::error::ErrorDetail;
use crate::state::AppState;

/// Append `error` detail to failure bodies unless running in production.
pub async fn expose(State(state): State<AppState>, response: Response) -> Response {
    if state.config.environment.is_production() {
        return response;
    }
    let Some(ErrorDetail { mut body, detail }) = response.extensions().get::<ErrorDetail>().cloned()
    else {
        return response;
    };

    body["error"] = Value::String(detail);
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body.to_string()))
}
