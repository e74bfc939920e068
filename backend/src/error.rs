//! Error handling for the inventory management platform
//!
//! Every error surfaces as a JSON body of the form `{message, error}`:
//! `message` is the human-readable summary, `error` carries the machine code
//! or, for stock rejections, the structured detail list.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::InsufficientMaterial;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Some raw materials are not associated with the product")]
    InvalidRawMaterials { invalid_materials: Vec<String> },

    #[error("Insufficient raw materials for production")]
    InsufficientMaterials {
        insufficient_materials: Vec<InsufficientMaterial>,
    },

    #[error("Some materials were not found")]
    MissingMaterials { missing_materials: Vec<String> },

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure, `{message, error}` on the wire
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: serde_json::Value,
}

impl AppError {
    /// Conflict over a named unique resource
    pub fn conflict(resource: &str, message: &str) -> Self {
        AppError::Conflict {
            resource: resource.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match &self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                msg.clone(),
                json!("UNAUTHORIZED"),
            ),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, msg.clone(), json!("FORBIDDEN"))
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                json!("VALIDATION_ERROR"),
            ),
            AppError::InvalidRawMaterials { invalid_materials } => (
                StatusCode::BAD_REQUEST,
                "Some raw materials are not associated with the product.".to_string(),
                json!({ "invalidMaterials": invalid_materials }),
            ),
            AppError::InsufficientMaterials {
                insufficient_materials,
            } => (
                StatusCode::BAD_REQUEST,
                "Production cannot happen due to insufficient raw materials.".to_string(),
                json!({ "insufficientMaterials": insufficient_materials }),
            ),
            AppError::MissingMaterials { missing_materials } => (
                StatusCode::BAD_REQUEST,
                format!("Some materials not found: {}", missing_materials.join(", ")),
                json!({ "missingMaterials": missing_materials }),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                message.clone(),
                json!({ "code": "CONFLICT", "resource": resource }),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                json!("NOT_FOUND"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred".to_string(),
                json!("DATABASE_ERROR"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                json!("INTERNAL_ERROR"),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
                json!("INTERNAL_ERROR"),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
