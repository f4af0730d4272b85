use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use decklab_core::auth::AuthError;
use decklab_core::error::CoreError;
use decklab_db::store::StoreError;
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{ success: false, message }`
/// envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `decklab_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage failure, with the operation it interrupted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Core(CoreError::Unauthorized(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Diagnostic detail for an error response, stashed in the response
/// extensions. Only surfaced to clients outside production; see
/// [`crate::middleware::error_detail`].
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    /// The sanitized body that was sent.
    pub body: Value,
    /// Underlying cause, e.g. the database error text.
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut detail = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::DeckNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "DECK_NOT_FOUND",
                    "Deck not found or you do not have permission to modify it".to_string(),
                ),
                CoreError::Unauthorized(auth) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", auth.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidDeck(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_DECK",
                    "Deck does not satisfy the construction rules".to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    detail = Some(msg.clone());
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Storage errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Storage error");
                detail = Some(err.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    capitalize(err.context()),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                detail = Some(msg.clone());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
            "code": code,
        });
        if let AppError::Core(CoreError::InvalidDeck(report)) = &self {
            body["errors"] = json!(report.errors);
            body["counts"] = json!(report.counts);
        }

        let mut response = (status, axum::Json(body.clone())).into_response();
        if let Some(detail) = detail {
            response
                .extensions_mut()
                .insert(ErrorDetail { body, detail });
        }
        response
    }
}

/// Upper-case the first letter of a storage context ("failed to ..." ->
/// "Failed to ...").
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
