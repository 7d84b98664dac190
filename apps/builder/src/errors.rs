use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::version::VersionId;
use crate::profile::ProfileError;

/// Why an edit against the store was refused. A rejected edit leaves every
/// version and the master content tree exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("Master is read-only; select or create a version first")]
    MasterReadOnly,

    #[error("No such item: {0}")]
    InvalidLocator(String),

    #[error("Unknown version: {0}")]
    UnknownVersion(VersionId),

    #[error("Unknown override path: {0}")]
    UnknownOverridePath(String),

    #[error("Company already exists: {0}")]
    DuplicateCompany(String),

    #[error("Renaming company '{0}' in master is not supported")]
    UnsupportedCompanyRename(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ProfileError::Invalid { .. } => AppError::Validation(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Saving editor state failed".to_string(),
                )
            }
            AppError::Yaml(e) => {
                tracing::error!("YAML error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "YAML_ERROR",
                    "Resume document could not be serialized".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
