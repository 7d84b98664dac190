use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::errors::AppError;
use crate::store::persistence::SnapshotStore;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One lock for the whole store: each request is a single atomic command.
    pub store: Arc<Mutex<ResumeStore>>,
    /// Pluggable snapshot backend. Default: JsonFileStore at STATE_PATH.
    pub snapshots: Arc<dyn SnapshotStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: ResumeStore, snapshots: Arc<dyn SnapshotStore>, config: Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            snapshots,
            config,
        }
    }

    /// Writes the store's persisted fields through the snapshot backend.
    pub async fn persist(&self, store: &ResumeStore) -> Result<(), AppError> {
        self.snapshots
            .save(&store.snapshot())
            .await
            .map_err(|e| AppError::Persistence(format!("{e:#}")))
    }
}
