//! HTTP route handlers.

pub mod alerts;
pub mod hazards;
pub mod health;
pub mod tracking;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
