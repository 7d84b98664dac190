//! Axum route handlers for document validation.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::state::AppState;
use crate::validation::{validate_resume, ValidationReport};

/// GET /api/v1/master/validate
///
/// Checks the in-memory master, so pushed edits and added items are covered.
pub async fn handle_validate_master(
    State(state): State<AppState>,
) -> Result<Json<ValidationReport>, AppError> {
    let report = {
        let store = state.store.lock().await;
        validate_resume(store.content())?
    };
    Ok(Json(report))
}
