//! Axum route handlers for the editor API.
//!
//! Every mutating endpoint is one store command: the store lock is held for
//! the command and the snapshot write that follows it. A command the store
//! refuses is not a transport failure; it answers 200 with `applied: false`
//! and the reason, and nothing is written.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{AppError, EditRejected};
use crate::models::resume::{Award, Certification, Education, Position, Project, ResumeData, Skill};
use crate::models::version::{BasedOn, ResumeVersion, VersionId};
use crate::overrides::{OverrideIndices, OverrideTarget, TextOverrides};
use crate::render::render_markdown;
use crate::selection::{CheckStates, SelectionState, ToggleCommand};
use crate::state::AppState;
use crate::store::ResumeStore;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Result of a store command.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<VersionId>,
    /// Index of a newly added item within its section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl CommandOutcome {
    fn rejected(reason: &EditRejected) -> Self {
        Self {
            applied: false,
            reason: Some(reason.to_string()),
            ..Default::default()
        }
    }
}

/// What a successful command reports back.
struct Applied(CommandOutcome);

impl From<()> for Applied {
    fn from(_: ()) -> Self {
        Applied(CommandOutcome {
            applied: true,
            ..Default::default()
        })
    }
}

impl From<VersionId> for Applied {
    fn from(id: VersionId) -> Self {
        Applied(CommandOutcome {
            applied: true,
            version_id: Some(id),
            ..Default::default()
        })
    }
}

impl From<usize> for Applied {
    fn from(index: usize) -> Self {
        Applied(CommandOutcome {
            applied: true,
            index: Some(index),
            ..Default::default()
        })
    }
}

#[derive(Debug, Serialize)]
pub struct VersionSummary {
    pub id: VersionId,
    pub name: String,
    pub description: Option<String>,
    pub based_on: BasedOn,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResumeVersion> for VersionSummary {
    fn from(v: &ResumeVersion) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            description: v.description.clone(),
            based_on: v.based_on,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub active_version_id: Option<VersionId>,
    pub show_preview: bool,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVersionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub based_on: Option<BasedOn>,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub version_id: Option<VersionId>,
}

#[derive(Debug, Serialize)]
pub struct SelectionsResponse {
    pub active_version_id: Option<VersionId>,
    pub selections: SelectionState,
    pub check_states: CheckStates,
}

#[derive(Debug, Serialize)]
pub struct OverridesResponse {
    pub active_version_id: Option<VersionId>,
    pub text_overrides: Option<TextOverrides>,
}

/// A dotted field path plus the indices it needs, e.g.
/// `{"path": "education.institution", "indices": {"index": 0}}`.
#[derive(Debug, Deserialize)]
pub struct OverrideLocator {
    pub path: String,
    #[serde(default)]
    pub indices: OverrideIndices,
}

impl OverrideLocator {
    fn target(&self) -> Result<OverrideTarget, EditRejected> {
        OverrideTarget::parse(&self.path, &self.indices)
    }
}

#[derive(Debug, Deserialize)]
pub struct OverrideValueRequest {
    #[serde(flatten)]
    pub locator: OverrideLocator,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub positions: Vec<Position>,
}

#[derive(Debug, Deserialize)]
pub struct AddPositionRequest {
    pub company: String,
    pub position: Position,
}

#[derive(Debug, Deserialize)]
pub struct PreviewVisibilityRequest {
    pub show: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub active_version_id: Option<VersionId>,
    pub show_preview: bool,
    pub resume: ResumeData,
    pub markdown: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Command runner
// ────────────────────────────────────────────────────────────────────────────

/// Runs one command under the store lock and persists the store if the
/// command was applied. A failed write rolls the in-memory store back, so
/// memory never holds an edit the client was told failed.
async fn run_command<T, F>(state: &AppState, command: F) -> Result<Json<CommandOutcome>, AppError>
where
    T: Into<Applied>,
    F: FnOnce(&mut ResumeStore) -> Result<T, EditRejected>,
{
    let mut store = state.store.lock().await;
    let before = store.clone();
    match command(&mut *store) {
        Ok(value) => {
            if let Err(e) = state.persist(&store).await {
                *store = before;
                return Err(e);
            }
            let Applied(outcome) = value.into();
            Ok(Json(outcome))
        }
        Err(rejected) => {
            warn!("Edit rejected: {rejected}");
            Ok(Json(CommandOutcome::rejected(&rejected)))
        }
    }
}

fn require_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Versions
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/store
pub async fn handle_get_store(State(state): State<AppState>) -> Json<StoreResponse> {
    let store = state.store.lock().await;
    Json(StoreResponse {
        active_version_id: store.active().version_id(),
        show_preview: store.show_preview(),
        versions: store.versions().iter().map(VersionSummary::from).collect(),
    })
}

/// POST /api/v1/versions
///
/// Creates a version from master (default) or from an existing version and
/// makes it active.
pub async fn handle_create_version(
    State(state): State<AppState>,
    Json(request): Json<CreateVersionRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    let name = require_name(&request.name)?;
    let based_on = request.based_on.unwrap_or(BasedOn::Master);
    run_command(&state, |store| {
        Ok(store.create_version(name, request.description, based_on))
    })
    .await
}

/// PATCH /api/v1/versions/:id
pub async fn handle_rename_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
    Json(request): Json<NameRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    let name = require_name(&request.name)?;
    run_command(&state, |store| store.rename_version(id, name)).await
}

/// DELETE /api/v1/versions/:id
pub async fn handle_delete_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| store.delete_version(id)).await
}

/// POST /api/v1/versions/:id/duplicate
pub async fn handle_duplicate_version(
    State(state): State<AppState>,
    Path(id): Path<VersionId>,
    Json(request): Json<NameRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    let name = require_name(&request.name)?;
    run_command(&state, |store| Ok(store.duplicate_version(id, name))).await
}

/// PUT /api/v1/active
///
/// `{"version_id": null}` switches to master.
pub async fn handle_set_active(
    State(state): State<AppState>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| store.set_active_version(request.version_id)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Selections
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/selections
///
/// Selection state of the active target with derived checkbox states.
pub async fn handle_get_selections(State(state): State<AppState>) -> Json<SelectionsResponse> {
    let store = state.store.lock().await;
    let selections = store.current_selections().into_owned();
    Json(SelectionsResponse {
        active_version_id: store.active().version_id(),
        check_states: selections.check_states(),
        selections,
    })
}

/// POST /api/v1/selections/toggle
pub async fn handle_toggle(
    State(state): State<AppState>,
    Json(command): Json<ToggleCommand>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| store.toggle(&command)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Text overrides
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/overrides
pub async fn handle_get_overrides(State(state): State<AppState>) -> Json<OverridesResponse> {
    let store = state.store.lock().await;
    Json(OverridesResponse {
        active_version_id: store.active().version_id(),
        text_overrides: store.current_text_overrides().cloned(),
    })
}

/// PUT /api/v1/overrides
pub async fn handle_set_override(
    State(state): State<AppState>,
    Json(request): Json<OverrideValueRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| {
        let target = request.locator.target()?;
        store.set_text_override(&target, request.value)
    })
    .await
}

/// DELETE /api/v1/overrides
///
/// Reverts the field to its master value.
pub async fn handle_remove_override(
    State(state): State<AppState>,
    Json(locator): Json<OverrideLocator>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| {
        let target = locator.target()?;
        store.remove_text_override(&target)
    })
    .await
}

/// POST /api/v1/overrides/push
///
/// Writes the value into the shared master tree; every version inherits it.
pub async fn handle_push_override(
    State(state): State<AppState>,
    Json(request): Json<OverrideValueRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| {
        let target = request.locator.target()?;
        store.push_override_to_master(&target, &request.value)
    })
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Master content
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/master
pub async fn handle_get_master(State(state): State<AppState>) -> Json<ResumeData> {
    Json(state.store.lock().await.content().clone())
}

/// GET /api/v1/master/export
///
/// The in-memory master as a YAML document, including pushed edits and
/// added items.
pub async fn handle_export_master(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let yaml = serde_yaml::to_string(state.store.lock().await.content())?;
    Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml))
}

/// POST /api/v1/master/companies
pub async fn handle_add_company(
    State(state): State<AppState>,
    Json(request): Json<AddCompanyRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    let name = require_name(&request.name)?;
    run_command(&state, |store| store.add_company(name, request.positions)).await
}

/// POST /api/v1/master/positions
pub async fn handle_add_position(
    State(state): State<AppState>,
    Json(request): Json<AddPositionRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| {
        store.add_position(&request.company, request.position)
    })
    .await
}

/// POST /api/v1/master/education
pub async fn handle_add_education(
    State(state): State<AppState>,
    Json(education): Json<Education>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| Ok(store.add_education(education))).await
}

/// POST /api/v1/master/projects
pub async fn handle_add_project(
    State(state): State<AppState>,
    Json(project): Json<Project>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| Ok(store.add_project(project))).await
}

/// POST /api/v1/master/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(skill): Json<Skill>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| Ok(store.add_skill(skill))).await
}

/// POST /api/v1/master/awards
pub async fn handle_add_award(
    State(state): State<AppState>,
    Json(award): Json<Award>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| Ok(store.add_award(award))).await
}

/// POST /api/v1/master/certifications
pub async fn handle_add_certification(
    State(state): State<AppState>,
    Json(certification): Json<Certification>,
) -> Result<Json<CommandOutcome>, AppError> {
    run_command(&state, |store| Ok(store.add_certification(certification))).await
}

// ────────────────────────────────────────────────────────────────────────────
// Preview
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/preview
///
/// The active target's resolved resume and its Markdown rendering.
pub async fn handle_preview(State(state): State<AppState>) -> Json<PreviewResponse> {
    let store = state.store.lock().await;
    let resume = store.resolved_view();
    let markdown = render_markdown(&resume);
    Json(PreviewResponse {
        active_version_id: store.active().version_id(),
        show_preview: store.show_preview(),
        resume,
        markdown,
    })
}

/// PUT /api/v1/preview/visibility
pub async fn handle_set_preview_visibility(
    State(state): State<AppState>,
    Json(request): Json<PreviewVisibilityRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    debug!("Preview visibility set to {}", request.show);
    run_command(&state, |store| {
        store.set_show_preview(request.show);
        Ok(())
    })
    .await
}
