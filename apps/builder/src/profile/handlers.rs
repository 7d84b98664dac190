//! Axum route handlers for the Profiles API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::profile::json::export_json;
use crate::profile::{
    filter_resume_data, list_available_profiles, load_profile, validate_profile, ProfileInfo,
};
use crate::render::render_markdown;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileListing {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ProfileInfo>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileListing>,
}

#[derive(Debug, Serialize)]
pub struct ProfileExportResponse {
    pub profile: ProfileInfo,
    pub resume: ResumeData,
    pub markdown: String,
}

/// GET /api/v1/profiles
///
/// Lists every profile file with its summary and any validation problems.
/// A file that fails to load is listed with its error instead of a summary.
pub async fn handle_list_profiles(State(state): State<AppState>) -> Json<ProfileListResponse> {
    let dir = &state.config.profiles_dir;
    let profiles = list_available_profiles(dir)
        .into_iter()
        .map(|id| match load_profile(&id, dir) {
            Ok(profile) => ProfileListing {
                info: Some(profile.info()),
                errors: validate_profile(&profile),
                id,
            },
            Err(e) => ProfileListing {
                info: None,
                errors: vec![e.to_string()],
                id,
            },
        })
        .collect();

    Json(ProfileListResponse { profiles })
}

/// GET /api/v1/profiles/:name
///
/// Applies the profile's tag filters to the current master content.
pub async fn handle_export_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ProfileExportResponse>, AppError> {
    let profile = load_profile(&name, &state.config.profiles_dir)?;
    let resume = {
        let store = state.store.lock().await;
        filter_resume_data(store.content(), &profile)
    };
    let markdown = render_markdown(&resume);

    Ok(Json(ProfileExportResponse {
        profile: profile.info(),
        resume,
        markdown,
    }))
}

/// GET /api/v1/profiles/:name/json
///
/// Same filtering as the export above, as a cleaned JSON document: tags
/// stripped, `export_meta` attached.
pub async fn handle_export_profile_json(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let profile = load_profile(&name, &state.config.profiles_dir)?;
    let resume = {
        let store = state.store.lock().await;
        filter_resume_data(store.content(), &profile)
    };
    let document = export_json(&resume, &profile.info()).map_err(anyhow::Error::from)?;
    Ok(Json(document))
}
