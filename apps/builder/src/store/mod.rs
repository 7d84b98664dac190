//! Resume store: the single mutable point of truth for the editor.
//!
//! Owns the master content tree, the version registry and the active-version
//! pointer. Every selection or override edit enters through here and is scoped
//! to the active version; Master is virtual and refuses all edits.
//!
//! Per-version state is copy-on-write: the active version's state is cloned,
//! the clone is edited, and the clone replaces the stored state only if the
//! edit succeeded. The master tree is edited in place.

pub mod handlers;
pub mod items;
pub mod persistence;

use std::borrow::Cow;

use tracing::{debug, info, warn};

use crate::errors::EditRejected;
use crate::models::resume::ResumeData;
use crate::models::version::{ActiveTarget, BasedOn, ResumeVersion, VersionId};
use crate::overrides::{effective_text, write_master, OverrideTarget, TextOverride, TextOverrides};
use crate::render::resolve_view;
use crate::selection::{SelectionState, ToggleCommand};

use self::persistence::PersistedStore;

#[derive(Debug, Clone)]
pub struct ResumeStore {
    content: ResumeData,
    versions: Vec<ResumeVersion>,
    active: ActiveTarget,
    show_preview: bool,
}

impl ResumeStore {
    pub fn new(content: ResumeData) -> Self {
        Self {
            content,
            versions: Vec::new(),
            active: ActiveTarget::Master,
            show_preview: true,
        }
    }

    /// Rebuilds a store from a persisted snapshot and a freshly loaded content
    /// tree. Stored selections are reconciled against the tree; an active
    /// pointer to a version that no longer exists falls back to Master.
    pub fn restore(content: ResumeData, snapshot: PersistedStore) -> Self {
        let mut versions = snapshot.versions;
        for version in &mut versions {
            version.selections.reconcile(&content);
        }
        let active = match snapshot.active_version_id {
            Some(id) if versions.iter().any(|v| v.id == id) => ActiveTarget::Version(id),
            Some(id) => {
                warn!("Persisted active version {id} no longer exists; falling back to master");
                ActiveTarget::Master
            }
            None => ActiveTarget::Master,
        };
        info!("Restored {} resume versions", versions.len());
        Self {
            content,
            versions,
            active,
            show_preview: snapshot.show_preview,
        }
    }

    /// The fields that survive a restart. The content tree is not among them.
    pub fn snapshot(&self) -> PersistedStore {
        PersistedStore {
            versions: self.versions.clone(),
            active_version_id: self.active.version_id(),
            show_preview: self.show_preview,
        }
    }

    pub fn content(&self) -> &ResumeData {
        &self.content
    }

    pub fn versions(&self) -> &[ResumeVersion] {
        &self.versions
    }

    pub fn version(&self, id: VersionId) -> Option<&ResumeVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn active(&self) -> ActiveTarget {
        self.active
    }

    pub fn active_version(&self) -> Option<&ResumeVersion> {
        self.active.version_id().and_then(|id| self.version(id))
    }

    pub fn show_preview(&self) -> bool {
        self.show_preview
    }

    pub fn set_show_preview(&mut self, show: bool) {
        self.show_preview = show;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Version registry
    // ────────────────────────────────────────────────────────────────────────

    /// Creates a version from `based_on` and makes it active. A stale source
    /// id falls back to the all-selected master state.
    pub fn create_version(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        based_on: BasedOn,
    ) -> VersionId {
        let selections = match based_on {
            BasedOn::Master => SelectionState::all_selected(&self.content),
            BasedOn::Version(source) => match self.version(source) {
                Some(v) => v.selections.clone(),
                None => {
                    warn!("Base version {source} not found; starting from master");
                    SelectionState::all_selected(&self.content)
                }
            },
        };
        let version = ResumeVersion::new(name.into(), description, based_on, selections, None);
        self.insert_active(version)
    }

    /// Copies a version's selections and overrides into a new, independent
    /// version and makes it active.
    pub fn duplicate_version(&mut self, source: VersionId, name: impl Into<String>) -> VersionId {
        let version = match self.version(source) {
            Some(v) => ResumeVersion::new(
                name.into(),
                v.description.clone(),
                BasedOn::Version(source),
                v.selections.clone(),
                v.text_overrides.clone(),
            ),
            None => {
                warn!("Version {source} to duplicate not found; starting from master");
                ResumeVersion::new(
                    name.into(),
                    None,
                    BasedOn::Master,
                    SelectionState::all_selected(&self.content),
                    None,
                )
            }
        };
        self.insert_active(version)
    }

    fn insert_active(&mut self, version: ResumeVersion) -> VersionId {
        let id = version.id;
        info!("Created version '{}' ({id}) based on {}", version.name, version.based_on);
        self.versions.push(version);
        self.active = ActiveTarget::Version(id);
        id
    }

    pub fn delete_version(&mut self, id: VersionId) -> Result<(), EditRejected> {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != id);
        if self.versions.len() == before {
            return Err(EditRejected::UnknownVersion(id));
        }
        if self.active == ActiveTarget::Version(id) {
            self.active = ActiveTarget::Master;
        }
        info!("Deleted version {id}");
        Ok(())
    }

    pub fn rename_version(&mut self, id: VersionId, name: impl Into<String>) -> Result<(), EditRejected> {
        let version = self
            .versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(EditRejected::UnknownVersion(id))?;
        version.name = name.into();
        version.touch();
        Ok(())
    }

    /// Switches the active target. `None` selects Master.
    pub fn set_active_version(&mut self, id: Option<VersionId>) -> Result<(), EditRejected> {
        if let Some(id) = id {
            if self.version(id).is_none() {
                return Err(EditRejected::UnknownVersion(id));
            }
        }
        self.active = ActiveTarget::from(id);
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Reads for the active target
    // ────────────────────────────────────────────────────────────────────────

    /// Master synthesizes an all-selected state on every read.
    pub fn current_selections(&self) -> Cow<'_, SelectionState> {
        match self.active_version() {
            Some(v) => Cow::Borrowed(&v.selections),
            None => Cow::Owned(SelectionState::all_selected(&self.content)),
        }
    }

    /// Master never has overrides.
    pub fn current_text_overrides(&self) -> Option<&TextOverrides> {
        self.active_version().and_then(|v| v.text_overrides.as_ref())
    }

    pub fn effective_text(&self, target: &OverrideTarget) -> Option<String> {
        effective_text(&self.content, self.current_text_overrides(), target)
    }

    /// The active target's content with deselected items removed and
    /// overrides applied.
    pub fn resolved_view(&self) -> ResumeData {
        resolve_view(
            &self.content,
            &self.current_selections(),
            self.current_text_overrides(),
        )
    }

    // ────────────────────────────────────────────────────────────────────────
    // Edits scoped to the active version
    // ────────────────────────────────────────────────────────────────────────

    fn active_version_mut(&mut self) -> Result<&mut ResumeVersion, EditRejected> {
        let id = self.active.version_id().ok_or(EditRejected::MasterReadOnly)?;
        self.versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(EditRejected::UnknownVersion(id))
    }

    /// The only way selection state changes. The mutator runs on a clone; the
    /// clone replaces the stored state only when the mutator succeeds.
    pub fn update_selections<F>(&mut self, mutate: F) -> Result<(), EditRejected>
    where
        F: FnOnce(&mut SelectionState) -> Result<(), EditRejected>,
    {
        let version = self.active_version_mut()?;
        let mut next = version.selections.clone();
        mutate(&mut next)?;
        version.selections = next;
        version.touch();
        Ok(())
    }

    pub fn toggle(&mut self, command: &ToggleCommand) -> Result<(), EditRejected> {
        debug!("Toggle {command:?}");
        self.update_selections(|selections| selections.apply(command))
    }

    pub fn set_text_override(
        &mut self,
        target: &OverrideTarget,
        value: impl Into<String>,
    ) -> Result<(), EditRejected> {
        self.active_version_mut()?;
        self.ensure_target_exists(target)?;
        let version = self.active_version_mut()?;
        let mut overrides = version.text_overrides.clone().unwrap_or_default();
        overrides.set(target, TextOverride::now(value));
        version.text_overrides = Some(overrides);
        version.touch();
        debug!("Set override {target}");
        Ok(())
    }

    /// Reverts a field to its master value. Removing an absent override is a
    /// no-op, not a rejection.
    pub fn remove_text_override(&mut self, target: &OverrideTarget) -> Result<(), EditRejected> {
        let version = self.active_version_mut()?;
        let Some(existing) = version.text_overrides.as_ref() else {
            return Ok(());
        };
        if existing.get(target).is_none() {
            return Ok(());
        }
        let mut overrides = existing.clone();
        overrides.remove(target);
        version.text_overrides = Some(overrides);
        version.touch();
        debug!("Removed override {target}");
        Ok(())
    }

    /// Writes `value` into the shared master tree. The active version's own
    /// override, if any, is left in place.
    pub fn push_override_to_master(
        &mut self,
        target: &OverrideTarget,
        value: &str,
    ) -> Result<(), EditRejected> {
        self.active_version_mut()?;
        write_master(&mut self.content, target, value)?;
        info!("Pushed {target} to master");
        Ok(())
    }

    fn ensure_target_exists(&self, target: &OverrideTarget) -> Result<(), EditRejected> {
        if crate::overrides::master_text(&self.content, target).is_none() {
            return Err(EditRejected::InvalidLocator(target.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;
    use crate::overrides::target::{EducationField, PositionField};
    use crate::selection::SectionId;

    fn store_with_v1() -> (ResumeStore, VersionId) {
        let mut store = ResumeStore::new(acme_resume());
        let id = store.create_version("V1", None, BasedOn::Master);
        (store, id)
    }

    fn bullet(company: &str, position: usize, bullet: usize) -> ToggleCommand {
        ToggleCommand::Bullet {
            company: company.into(),
            position,
            bullet,
        }
    }

    fn institution() -> OverrideTarget {
        OverrideTarget::Education {
            index: 0,
            field: EducationField::Institution,
        }
    }

    #[test]
    fn test_create_from_master_selects_everything_and_activates() {
        let (store, id) = store_with_v1();
        assert_eq!(store.active(), ActiveTarget::Version(id));

        let v1 = store.version(id).unwrap();
        assert_eq!(v1.based_on, BasedOn::Master);
        assert!(v1.text_overrides.is_none());
        let acme = v1.selections.company("Acme").unwrap();
        assert!(acme.selected);
        assert_eq!(acme.positions.len(), 1);
        assert!(acme.positions[0].selected);
        assert_eq!(acme.positions[0].bullets, [true, true, true]);
    }

    #[test]
    fn test_toggle_scenario_end_to_end() {
        let (mut store, id) = store_with_v1();

        store.toggle(&bullet("Acme", 0, 0)).unwrap();
        store.toggle(&bullet("Acme", 0, 1)).unwrap();
        store.toggle(&bullet("Acme", 0, 2)).unwrap();
        let sel = &store.version(id).unwrap().selections;
        assert!(!sel.company("Acme").unwrap().selected);

        store
            .toggle(&ToggleCommand::Company {
                company: "Acme".into(),
            })
            .unwrap();
        let sel = &store.version(id).unwrap().selections;
        assert_eq!(sel.company("Acme").unwrap().positions[0].bullets, [true, true, true]);
        assert!(sel.company("Acme").unwrap().selected);
    }

    #[test]
    fn test_create_based_on_version_copies_selections() {
        let (mut store, v1) = store_with_v1();
        store.toggle(&ToggleCommand::Education { index: 0 }).unwrap();

        let v2 = store.create_version("V2", Some("copy".into()), BasedOn::Version(v1));
        let v2 = store.version(v2).unwrap();
        assert_eq!(v2.selections.education, [false]);
        assert_eq!(v2.based_on, BasedOn::Version(v1));
    }

    #[test]
    fn test_create_with_stale_base_falls_back_to_master() {
        let mut store = ResumeStore::new(acme_resume());
        let stale = uuid::Uuid::new_v4();
        let id = store.create_version("V", None, BasedOn::Version(stale));
        assert_eq!(
            store.version(id).unwrap().selections,
            SelectionState::all_selected(store.content())
        );
    }

    #[test]
    fn test_duplicate_is_isolated_from_source() {
        let (mut store, a) = store_with_v1();
        store.set_text_override(&institution(), "MIT").unwrap();

        let b = store.duplicate_version(a, "B");
        assert_eq!(store.active(), ActiveTarget::Version(b));
        assert_eq!(store.version(b).unwrap().based_on, BasedOn::Version(a));
        assert_eq!(
            store.version(b).unwrap().text_overrides,
            store.version(a).unwrap().text_overrides
        );

        store.toggle(&bullet("Acme", 0, 0)).unwrap();
        store.remove_text_override(&institution()).unwrap();
        let a_version = store.version(a).unwrap();
        assert!(a_version.selections.company("Acme").unwrap().positions[0].bullets[0]);
        assert!(a_version.text_overrides.as_ref().unwrap().get(&institution()).is_some());

        store.set_active_version(Some(a)).unwrap();
        store.toggle(&ToggleCommand::Skill { index: 0 }).unwrap();
        assert_eq!(store.version(b).unwrap().selections.skills, [true]);
    }

    #[test]
    fn test_duplicate_stale_id_starts_from_master() {
        let mut store = ResumeStore::new(acme_resume());
        let id = store.duplicate_version(uuid::Uuid::new_v4(), "Orphan");
        let version = store.version(id).unwrap();
        assert_eq!(version.based_on, BasedOn::Master);
        assert!(version.text_overrides.is_none());
    }

    #[test]
    fn test_delete_active_resets_to_master() {
        let (mut store, id) = store_with_v1();
        store.delete_version(id).unwrap();
        assert_eq!(store.active(), ActiveTarget::Master);
        assert!(store.versions().is_empty());
        assert_eq!(
            store.delete_version(id),
            Err(EditRejected::UnknownVersion(id))
        );
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut store, v1) = store_with_v1();
        let v2 = store.create_version("V2", None, BasedOn::Master);
        store.delete_version(v1).unwrap();
        assert_eq!(store.active(), ActiveTarget::Version(v2));
    }

    #[test]
    fn test_rename_only_touches_name_and_timestamp() {
        let (mut store, id) = store_with_v1();
        let before = store.version(id).unwrap().clone();
        store.rename_version(id, "Renamed").unwrap();
        let after = store.version(id).unwrap();
        assert_eq!(after.name, "Renamed");
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.selections, before.selections);
        assert_eq!(after.based_on, before.based_on);
    }

    #[test]
    fn test_set_active_rejects_unknown_id() {
        let (mut store, id) = store_with_v1();
        let stale = uuid::Uuid::new_v4();
        assert_eq!(
            store.set_active_version(Some(stale)),
            Err(EditRejected::UnknownVersion(stale))
        );
        assert_eq!(store.active(), ActiveTarget::Version(id));
        store.set_active_version(None).unwrap();
        assert_eq!(store.active(), ActiveTarget::Master);
    }

    #[test]
    fn test_master_is_immutable() {
        let (mut store, _) = store_with_v1();
        store.set_active_version(None).unwrap();
        let before = store.clone();

        let job_title = OverrideTarget::Position {
            company: "Acme".into(),
            position: 0,
            field: PositionField::JobTitle,
        };
        assert_eq!(
            store.toggle(&bullet("Acme", 0, 0)),
            Err(EditRejected::MasterReadOnly)
        );
        assert_eq!(
            store.set_text_override(&job_title, "CTO"),
            Err(EditRejected::MasterReadOnly)
        );
        assert_eq!(
            store.remove_text_override(&job_title),
            Err(EditRejected::MasterReadOnly)
        );
        assert_eq!(
            store.push_override_to_master(&job_title, "CTO"),
            Err(EditRejected::MasterReadOnly)
        );

        assert_eq!(store.versions(), before.versions());
        assert_eq!(store.content(), before.content());
        assert!(store.current_text_overrides().is_none());
        assert_eq!(
            *store.current_selections(),
            SelectionState::all_selected(store.content())
        );
    }

    #[test]
    fn test_failed_mutator_leaves_state_and_timestamp() {
        let (mut store, id) = store_with_v1();
        let before = store.version(id).unwrap().clone();
        let result = store.update_selections(|s| {
            s.toggle_section(SectionId::Awards);
            s.toggle_bullet("Acme", 0, 99)
        });
        assert!(matches!(result, Err(EditRejected::InvalidLocator(_))));
        assert_eq!(store.version(id).unwrap(), &before);
    }

    #[test]
    fn test_override_then_revert() {
        let (mut store, _) = store_with_v1();
        store.set_text_override(&institution(), "MIT").unwrap();
        assert_eq!(store.effective_text(&institution()).as_deref(), Some("MIT"));

        store.remove_text_override(&institution()).unwrap();
        assert_eq!(
            store.effective_text(&institution()).as_deref(),
            Some("State University")
        );
    }

    #[test]
    fn test_override_survives_deselection() {
        let (mut store, _) = store_with_v1();
        store.set_text_override(&institution(), "MIT").unwrap();
        store.toggle(&ToggleCommand::Education { index: 0 }).unwrap();
        assert_eq!(store.effective_text(&institution()).as_deref(), Some("MIT"));
        assert!(store.resolved_view().education.is_empty());

        store.toggle(&ToggleCommand::Education { index: 0 }).unwrap();
        assert_eq!(store.resolved_view().education[0].institution, "MIT");
    }

    #[test]
    fn test_override_on_missing_item_is_rejected() {
        let (mut store, id) = store_with_v1();
        let target = OverrideTarget::Education {
            index: 3,
            field: EducationField::Institution,
        };
        assert!(matches!(
            store.set_text_override(&target, "Nowhere"),
            Err(EditRejected::InvalidLocator(_))
        ));
        assert!(store.version(id).unwrap().text_overrides.is_none());
    }

    #[test]
    fn test_master_rejection_wins_over_bad_locator() {
        let (mut store, _) = store_with_v1();
        store.set_active_version(None).unwrap();
        let target = OverrideTarget::Education {
            index: 3,
            field: EducationField::Institution,
        };
        assert_eq!(
            store.set_text_override(&target, "Nowhere"),
            Err(EditRejected::MasterReadOnly)
        );
    }

    #[test]
    fn test_push_to_master_keeps_override_and_reaches_all_versions() {
        let (mut store, v1) = store_with_v1();
        let v2 = store.create_version("V2", None, BasedOn::Master);
        store.set_active_version(Some(v1)).unwrap();
        store.set_text_override(&institution(), "MIT").unwrap();

        store.push_override_to_master(&institution(), "MIT").unwrap();
        assert_eq!(store.content().education[0].institution, "MIT");
        assert!(store.current_text_overrides().unwrap().get(&institution()).is_some());

        store.set_active_version(Some(v2)).unwrap();
        assert_eq!(store.effective_text(&institution()).as_deref(), Some("MIT"));
        store.set_active_version(None).unwrap();
        assert_eq!(store.resolved_view().education[0].institution, "MIT");
    }

    #[test]
    fn test_push_company_rename_is_rejected() {
        let (mut store, _) = store_with_v1();
        let before = store.content().clone();
        let result = store.push_override_to_master(
            &OverrideTarget::CompanyName {
                company: "Acme".into(),
            },
            "Acme Corp",
        );
        assert_eq!(
            result,
            Err(EditRejected::UnsupportedCompanyRename("Acme".into()))
        );
        assert_eq!(store.content(), &before);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let (mut store, id) = store_with_v1();
        store.toggle(&bullet("Acme", 0, 1)).unwrap();
        store.set_show_preview(false);

        let restored = ResumeStore::restore(acme_resume(), store.snapshot());
        assert_eq!(restored.active(), ActiveTarget::Version(id));
        assert_eq!(restored.versions(), store.versions());
        assert!(!restored.show_preview());
    }

    #[test]
    fn test_restore_with_stale_active_pointer() {
        let (store, _) = store_with_v1();
        let mut snapshot = store.snapshot();
        snapshot.active_version_id = Some(uuid::Uuid::new_v4());
        let restored = ResumeStore::restore(acme_resume(), snapshot);
        assert_eq!(restored.active(), ActiveTarget::Master);
    }
}
