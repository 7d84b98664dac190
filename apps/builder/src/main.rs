mod config;
mod errors;
mod models;
mod overrides;
mod profile;
mod render;
mod routes;
mod selection;
mod state;
mod store;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::models::resume::load_resume;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::persistence::{JsonFileStore, SnapshotStore};
use crate::store::ResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume builder v{}", env!("CARGO_PKG_VERSION"));

    // Master content is read once; it is never written back to disk
    let content = load_resume(&config.resume_path)?;
    info!(
        "Loaded {} from {}",
        content.basics.name,
        config.resume_path.display()
    );

    // Schema problems are reported, never fatal
    match validation::validate_file(&config.resume_path) {
        Ok(report) => {
            for issue in report.issues() {
                warn!("{}: {}", issue.field_path, issue.message);
            }
            info!(
                "Validated resume: {} errors, {} warnings",
                report.errors.len(),
                report.warnings.len()
            );
        }
        Err(e) => warn!("Skipping resume validation: {e:#}"),
    }

    // Restore the version registry, if one was saved
    let snapshots = Arc::new(JsonFileStore::new(&config.state_path));
    let store = match snapshots.load().await {
        Ok(Some(snapshot)) => ResumeStore::restore(content, snapshot),
        Ok(None) => {
            info!("No saved state at {}; starting fresh", snapshots.path().display());
            ResumeStore::new(content)
        }
        Err(e) => {
            warn!("Ignoring unreadable saved state: {e:#}");
            match snapshots.move_aside().await {
                Ok(backup) => warn!("Moved unreadable state to {}", backup.display()),
                Err(e) => warn!("Could not keep unreadable state: {e:#}"),
            }
            ResumeStore::new(content)
        }
    };

    let state = AppState::new(store, snapshots, config.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
