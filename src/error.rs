// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Could not resolve location: {0}")]
    GeocodeFailure(String),

    #[error("Geocoding service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The primary write landed but a compensating write to the paired
    /// entity failed. The two documents disagree until a retry or manual
    /// reconciliation; this must never be reported as plain success.
    #[error("{primary} succeeded but {compensating} failed: {source}")]
    Inconsistent {
        primary: String,
        compensating: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wrap a failed compensating write, naming both halves of the
    /// cross-entity operation.
    pub fn inconsistent(primary: &str, compensating: &str, source: AppError) -> Self {
        AppError::Inconsistent {
            primary: primary.to_string(),
            compensating: compensating.to_string(),
            source: Box::new(source),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::GeocodeFailure(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "geocode_failure",
                Some(msg.clone()),
            ),
            AppError::UpstreamUnavailable(msg) => {
                tracing::warn!(error = %msg, "Geocoding upstream unavailable");
                (StatusCode::BAD_GATEWAY, "upstream_unavailable", None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Inconsistent { .. } => {
                tracing::error!(error = %self, "Cross-entity write left documents inconsistent");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "inconsistent_state",
                    Some(self.to_string()),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
