pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::profile::handlers as profiles;
use crate::state::AppState;
use crate::store::handlers;
use crate::validation::handlers as validation;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Version registry
        .route("/api/v1/store", get(handlers::handle_get_store))
        .route("/api/v1/versions", post(handlers::handle_create_version))
        .route(
            "/api/v1/versions/:id",
            patch(handlers::handle_rename_version).delete(handlers::handle_delete_version),
        )
        .route(
            "/api/v1/versions/:id/duplicate",
            post(handlers::handle_duplicate_version),
        )
        .route("/api/v1/active", put(handlers::handle_set_active))
        // Selections
        .route("/api/v1/selections", get(handlers::handle_get_selections))
        .route("/api/v1/selections/toggle", post(handlers::handle_toggle))
        // Text overrides
        .route(
            "/api/v1/overrides",
            get(handlers::handle_get_overrides)
                .put(handlers::handle_set_override)
                .delete(handlers::handle_remove_override),
        )
        .route("/api/v1/overrides/push", post(handlers::handle_push_override))
        // Master content
        .route("/api/v1/master", get(handlers::handle_get_master))
        .route("/api/v1/master/export", get(handlers::handle_export_master))
        .route("/api/v1/master/validate", get(validation::handle_validate_master))
        .route("/api/v1/master/companies", post(handlers::handle_add_company))
        .route("/api/v1/master/positions", post(handlers::handle_add_position))
        .route("/api/v1/master/education", post(handlers::handle_add_education))
        .route("/api/v1/master/projects", post(handlers::handle_add_project))
        .route("/api/v1/master/skills", post(handlers::handle_add_skill))
        .route("/api/v1/master/awards", post(handlers::handle_add_award))
        .route(
            "/api/v1/master/certifications",
            post(handlers::handle_add_certification),
        )
        // Preview
        .route("/api/v1/preview", get(handlers::handle_preview))
        .route(
            "/api/v1/preview/visibility",
            put(handlers::handle_set_preview_visibility),
        )
        // Profiles
        .route("/api/v1/profiles", get(profiles::handle_list_profiles))
        .route("/api/v1/profiles/:name", get(profiles::handle_export_profile))
        .route(
            "/api/v1/profiles/:name/json",
            get(profiles::handle_export_profile_json),
        )
        .with_state(state)
}
