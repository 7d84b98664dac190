use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::version::{ResumeVersion, VersionId};

/// The part of the store that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStore {
    #[serde(default)]
    pub versions: Vec<ResumeVersion>,
    #[serde(default)]
    pub active_version_id: Option<VersionId>,
    #[serde(default = "default_show_preview")]
    pub show_preview: bool,
}

fn default_show_preview() -> bool {
    true
}

impl Default for PersistedStore {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            active_version_id: None,
            show_preview: default_show_preview(),
        }
    }
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `None` when nothing has been saved yet.
    async fn load(&self) -> anyhow::Result<Option<PersistedStore>>;

    async fn save(&self, snapshot: &PersistedStore) -> anyhow::Result<()>;
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file backend
// ────────────────────────────────────────────────────────────────────────────

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames an unreadable snapshot to `<path>.bak` so the next save does
    /// not overwrite it. Returns the backup location.
    pub async fn move_aside(&self) -> anyhow::Result<PathBuf> {
        let mut backup = self.path.as_os_str().to_owned();
        backup.push(".bak");
        let backup = PathBuf::from(backup);
        tokio::fs::rename(&self.path, &backup).await.with_context(|| {
            format!(
                "Failed to move {} to {}",
                self.path.display(),
                backup.display()
            )
        })?;
        Ok(backup)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<Option<PersistedStore>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Writes to a temp file next to the target and renames it into place, so
    /// a crash mid-write never leaves a truncated snapshot.
    async fn save(&self, snapshot: &PersistedStore) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;

            let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(())
        })
        .await??;

        debug!("Saved store snapshot to {}", self.path.display());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Default)]
pub struct MemorySnapshotStore {
    inner: std::sync::Mutex<Option<PersistedStore>>,
}

#[cfg(test)]
impl MemorySnapshotStore {
    pub fn saved(&self) -> Option<PersistedStore> {
        self.inner.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> anyhow::Result<Option<PersistedStore>> {
        Ok(self.saved())
    }

    async fn save(&self, snapshot: &PersistedStore) -> anyhow::Result<()> {
        *self.inner.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;
    use crate::models::version::BasedOn;
    use crate::overrides::target::{BasicsField, EducationField, OverrideTarget};
    use crate::store::ResumeStore;

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let files = JsonFileStore::new(dir.path().join("nested").join("state.json"));

        let mut store = ResumeStore::new(acme_resume());
        store.create_version("Backend", Some("infra roles".into()), BasedOn::Master);
        store.set_show_preview(false);
        let snapshot = store.snapshot();

        files.save(&snapshot).await.unwrap();
        assert_eq!(files.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_text_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let files = JsonFileStore::new(dir.path().join("state.json"));

        let mut store = ResumeStore::new(acme_resume());
        let id = store.create_version("Research", None, BasedOn::Master);
        let targets = [
            (OverrideTarget::Basics(BasicsField::Label), "Research Engineer"),
            (
                OverrideTarget::Education {
                    index: 0,
                    field: EducationField::Institution,
                },
                "MIT",
            ),
            (OverrideTarget::Course { index: 0, course: 1 }, "Distributed Systems"),
        ];
        for (target, value) in &targets {
            store.set_text_override(target, *value).unwrap();
        }
        let snapshot = store.snapshot();

        files.save(&snapshot).await.unwrap();
        let loaded = files.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);

        let restored = ResumeStore::restore(acme_resume(), loaded);
        assert_eq!(restored.active_version().map(|v| v.id), Some(id));
        for (target, value) in &targets {
            assert_eq!(restored.effective_text(target).as_deref(), Some(*value));
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let files = JsonFileStore::new(dir.path().join("state.json"));

        files.save(&PersistedStore::default()).await.unwrap();
        let next = PersistedStore {
            show_preview: false,
            ..Default::default()
        };
        files.save(&next).await.unwrap();
        assert_eq!(files.load().await.unwrap(), Some(next));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::new(path).load().await.is_err());
    }

    #[tokio::test]
    async fn test_move_aside_keeps_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let files = JsonFileStore::new(&path);

        let backup = files.move_aside().await.unwrap();
        assert_eq!(backup, dir.path().join("state.json.bak"));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{not json");

        files.save(&PersistedStore::default()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{not json");
        assert!(files.load().await.unwrap().is_some());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let snapshot: PersistedStore = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, PersistedStore::default());
        assert!(snapshot.show_preview);
    }

    #[test]
    fn test_wire_layout_is_camel_case() {
        let json = serde_json::to_value(PersistedStore::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "versions": [], "activeVersionId": null, "showPreview": true })
        );
    }
}
