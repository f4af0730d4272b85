//! Request extractors and response middleware.
//!
//! - [`auth::AuthUser`] -- the caller resolved from a bearer session token.
//! - [`error_detail::expose`] -- adds error detail to failure bodies outside
//!   production.

pub mod auth;
pub mod error_detail;
