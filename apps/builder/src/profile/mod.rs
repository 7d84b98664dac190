//! Profile-based tag filtering.
//!
//! A profile is a small YAML file under the profiles directory that narrows
//! the master resume to the items tagged for one audience (`backend`,
//! `leadership`, ...) and optionally caps bullets per job. Filtering works on
//! `include_in` tags and is independent of version selections.

pub mod handlers;
pub mod json;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::{
    Award, Certification, Company, Education, Position, Project, ResumeData, Skill, UNIVERSAL_TAG,
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile '{name}' not found at {}", .path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("Profile '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Profile document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFilters {
    #[serde(default = "default_include_tags")]
    pub include_tags: Vec<String>,
    /// Zero, negative or absent means no limit.
    #[serde(default)]
    pub max_bullets_per_job: Option<i64>,
}

impl Default for ProfileFilters {
    fn default() -> Self {
        Self {
            include_tags: default_include_tags(),
            max_bullets_per_job: None,
        }
    }
}

fn default_include_tags() -> Vec<String> {
    vec![UNIVERSAL_TAG.to_string()]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOutput {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub profile: Option<ProfileMeta>,
    #[serde(default)]
    pub filters: ProfileFilters,
    #[serde(default)]
    pub output: ProfileOutput,
}

/// Flattened summary of a profile, with display defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileInfo {
    pub name: String,
    pub description: String,
    pub slug: String,
    pub include_tags: Vec<String>,
    pub max_bullets_per_job: Option<i64>,
    pub filename: String,
    pub title_suffix: String,
}

impl Profile {
    pub fn info(&self) -> ProfileInfo {
        let meta = self.profile.clone().unwrap_or_default();
        ProfileInfo {
            name: meta.name.unwrap_or_else(|| "Unknown".to_string()),
            description: meta.description.unwrap_or_default(),
            slug: meta.slug.unwrap_or_default(),
            include_tags: self.filters.include_tags.clone(),
            max_bullets_per_job: self.filters.max_bullets_per_job,
            filename: self
                .output
                .filename
                .clone()
                .unwrap_or_else(|| "resume".to_string()),
            title_suffix: self.output.title_suffix.clone().unwrap_or_default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

pub fn load_profile(name: &str, profiles_dir: &Path) -> Result<Profile, ProfileError> {
    let invalid = |reason: String| ProfileError::Invalid {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(invalid("name must be a plain file stem".to_string()));
    }

    let path = profiles_dir.join(format!("{name}.yaml"));
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProfileError::NotFound {
                name: name.to_string(),
                path,
            })
        }
        Err(e) => return Err(invalid(e.to_string())),
    };

    if source.trim().is_empty() {
        return Err(invalid("file is empty".to_string()));
    }
    serde_yaml::from_str(&source).map_err(|e| invalid(e.to_string()))
}

/// Sorted file stems of every `*.yaml` in `profiles_dir`. A missing
/// directory lists nothing.
pub fn list_available_profiles(profiles_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(profiles_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

/// Structural problems that do not stop a profile from loading.
pub fn validate_profile(profile: &Profile) -> Vec<String> {
    let mut errors = Vec::new();
    match &profile.profile {
        None => errors.push("Missing 'profile' section".to_string()),
        Some(meta) if meta.name.is_none() => errors.push("Missing 'profile.name'".to_string()),
        Some(_) => {}
    }
    errors
}

// ────────────────────────────────────────────────────────────────────────────
// Filtering
// ────────────────────────────────────────────────────────────────────────────

/// Items that carry `include_in` profile tags.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

macro_rules! impl_tagged {
    ($($ty:ty),+) => {
        $(impl Tagged for $ty {
            fn tags(&self) -> &[String] {
                &self.include_in
            }
        })+
    };
}

impl_tagged!(Position, Education, Award, Certification, Skill, Project);

/// Kept when any tag is in `include_tags`. Untagged items are kept only when
/// `include_tags` contains the universal tag.
pub fn is_included(tags: &[String], include_tags: &[String]) -> bool {
    if tags.is_empty() {
        return include_tags.iter().any(|t| t == UNIVERSAL_TAG);
    }
    tags.iter().any(|t| include_tags.contains(t))
}

pub fn filter_items<T: Tagged + Clone>(items: &[T], include_tags: &[String]) -> Vec<T> {
    items
        .iter()
        .filter(|item| is_included(item.tags(), include_tags))
        .cloned()
        .collect()
}

pub fn apply_bullet_limit<T: Clone>(bullets: &[T], max_bullets: Option<i64>) -> Vec<T> {
    match max_bullets {
        Some(max) if max > 0 => bullets.iter().take(max as usize).cloned().collect(),
        _ => bullets.to_vec(),
    }
}

/// Applies a profile to the whole document. Basics and unmodelled sections
/// pass through unchanged.
pub fn filter_resume_data(resume: &ResumeData, profile: &Profile) -> ResumeData {
    let include = &profile.filters.include_tags;
    let max_bullets = profile.filters.max_bullets_per_job;

    let work_experience = resume
        .work_experience
        .iter()
        .filter_map(|company| {
            let positions: Vec<Position> = filter_items(&company.positions, include)
                .into_iter()
                .map(|p| Position {
                    responsibilities: apply_bullet_limit(&p.responsibilities, max_bullets),
                    ..p
                })
                .collect();
            (!positions.is_empty()).then(|| Company {
                name: company.name.clone(),
                positions,
            })
        })
        .collect();

    let projects = filter_items(&resume.projects, include)
        .into_iter()
        .map(|p| Project {
            highlights: apply_bullet_limit(&p.highlights, max_bullets),
            ..p
        })
        .collect();

    ResumeData {
        basics: resume.basics.clone(),
        work_experience,
        education: filter_items(&resume.education, include),
        awards: filter_items(&resume.awards, include),
        certifications: filter_items(&resume.certifications, include),
        skills: filter_items(&resume.skills, include),
        projects,
        extra: resume.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn profile_with(include: &[&str], max_bullets: Option<i64>) -> Profile {
        Profile {
            filters: ProfileFilters {
                include_tags: tags(include),
                max_bullets_per_job: max_bullets,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_is_included_rules() {
        assert!(is_included(&tags(&["backend"]), &tags(&["backend", "ml"])));
        assert!(!is_included(&tags(&["frontend"]), &tags(&["backend"])));
        assert!(is_included(&[], &tags(&["all"])));
        assert!(!is_included(&[], &tags(&["backend"])));
        assert!(!is_included(&tags(&["backend"]), &[]));
    }

    #[test]
    fn test_bullet_limit() {
        let bullets = [1, 2, 3, 4];
        assert_eq!(apply_bullet_limit(&bullets, Some(2)), [1, 2]);
        assert_eq!(apply_bullet_limit(&bullets, Some(0)), bullets);
        assert_eq!(apply_bullet_limit(&bullets, Some(-1)), bullets);
        assert_eq!(apply_bullet_limit(&bullets, None), bullets);
        assert_eq!(apply_bullet_limit(&bullets, Some(10)), bullets);
    }

    #[test]
    fn test_default_profile_keeps_everything_tagged_all_or_untagged() {
        let resume = acme_resume();
        let filtered = filter_resume_data(&resume, &Profile::default());
        assert_eq!(filtered, resume);
    }

    #[test]
    fn test_narrow_profile_drops_empty_companies_and_untagged_items() {
        let mut resume = acme_resume();
        resume.skills[0].include_in = tags(&["technical"]);
        let filtered = filter_resume_data(&resume, &profile_with(&["technical"], None));

        assert!(filtered.work_experience.is_empty());
        assert!(filtered.education.is_empty());
        assert!(filtered.awards.is_empty());
        assert_eq!(filtered.skills.len(), 1);
        assert_eq!(filtered.basics, resume.basics);
    }

    #[test]
    fn test_bullet_cap_applies_to_positions_and_projects() {
        let filtered = filter_resume_data(&acme_resume(), &profile_with(&["all"], Some(1)));
        let position = filtered.work_experience.position("Acme", 0).unwrap();
        assert_eq!(position.responsibilities.len(), 1);
        assert_eq!(filtered.projects[0].highlights.len(), 1);
    }

    #[test]
    fn test_load_list_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("backend.yaml"),
            "profile:\n  name: Backend\n  slug: backend\nfilters:\n  include_tags: [backend]\n  max_bullets_per_job: 3\noutput:\n  filename: jane-backend\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("anon.yaml"), "filters: {}\n").unwrap();
        std::fs::write(dir.path().join("empty.yaml"), "  \n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            list_available_profiles(dir.path()),
            ["anon", "backend", "empty"]
        );

        let backend = load_profile("backend", dir.path()).unwrap();
        assert!(validate_profile(&backend).is_empty());
        let info = backend.info();
        assert_eq!(info.name, "Backend");
        assert_eq!(info.include_tags, ["backend"]);
        assert_eq!(info.max_bullets_per_job, Some(3));
        assert_eq!(info.filename, "jane-backend");

        let anon = load_profile("anon", dir.path()).unwrap();
        assert_eq!(anon.filters.include_tags, ["all"]);
        assert_eq!(validate_profile(&anon), ["Missing 'profile' section"]);
        assert_eq!(anon.info().name, "Unknown");

        assert!(matches!(
            load_profile("empty", dir.path()),
            Err(ProfileError::Invalid { .. })
        ));
        assert!(matches!(
            load_profile("missing", dir.path()),
            Err(ProfileError::NotFound { .. })
        ));
        assert!(matches!(
            load_profile("../backend", dir.path()),
            Err(ProfileError::Invalid { .. })
        ));
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        assert!(list_available_profiles(Path::new("/nonexistent/profiles")).is_empty());
    }
}
