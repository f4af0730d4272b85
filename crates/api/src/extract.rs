//! Extractors that reject malformed input with the JSON error envelope.
//!
//! Axum's own `Json`, `Path` and `Query` answer a bad body or parameter
//! with a plain-text rejection. These wrappers route the rejection through
//! [`AppError`] so every failure has the same `{ success: false, message }`
//! shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Typed query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
