use std::collections::BTreeMap;

use tracing::debug;

use crate::models::resume::{Company, Position, Project, ResumeData, WorkExperience};
use crate::overrides::{write_master, OverrideTarget, TextOverrides};
use crate::selection::state::{CompanySelection, ProjectSelection};
use crate::selection::{SectionId, SelectionState};

/// Projects the master tree through one version: overrides are applied,
/// deselected items and hidden sections are dropped. The result has the same
/// shape as the master document, so it can be rendered or exported as-is.
pub fn resolve_view(
    content: &ResumeData,
    selections: &SelectionState,
    overrides: Option<&TextOverrides>,
) -> ResumeData {
    let mut text = content.clone();
    let mut company_names = BTreeMap::new();

    for (target, value) in overrides.map(TextOverrides::entries).unwrap_or_default() {
        match target {
            OverrideTarget::CompanyName { company } => {
                company_names.insert(company, value.value.clone());
            }
            target => {
                if write_master(&mut text, &target, &value.value).is_err() {
                    debug!("Skipping override for missing item {target}");
                }
            }
        }
    }

    let visible = |section| selections.is_section_visible(section);
    let mut view = ResumeData {
        basics: text.basics,
        extra: text.extra,
        ..Default::default()
    };

    if !visible(SectionId::Summary) {
        view.basics.summary = None;
        view.basics.short_summary = None;
    }
    if visible(SectionId::Experience) {
        view.work_experience = select_work(&text.work_experience, selections, &company_names);
    }
    if visible(SectionId::Projects) {
        view.projects = select_projects(text.projects, &selections.projects);
    }
    if visible(SectionId::Skills) {
        view.skills = pick(text.skills, &selections.skills);
    }
    if visible(SectionId::Education) {
        view.education = pick(text.education, &selections.education);
    }
    if visible(SectionId::Certifications) {
        view.certifications = pick(text.certifications, &selections.certifications);
    }
    if visible(SectionId::Awards) {
        view.awards = pick(text.awards, &selections.awards);
    }
    view
}

/// Keeps items whose flag is set. Items without a flag are dropped.
fn pick<T>(items: Vec<T>, flags: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter(|(i, _)| flags.get(*i).copied().unwrap_or(false))
        .map(|(_, item)| item)
        .collect()
}

fn select_work(
    work: &WorkExperience,
    selections: &SelectionState,
    company_names: &BTreeMap<String, String>,
) -> WorkExperience {
    work.iter()
        .filter_map(|company| {
            let selection = selections.company(&company.name)?;
            let positions = select_positions(&company.positions, selection);
            if !selection.selected || positions.is_empty() {
                return None;
            }
            let name = company_names
                .get(&company.name)
                .cloned()
                .unwrap_or_else(|| company.name.clone());
            Some(Company { name, positions })
        })
        .collect()
}

fn select_positions(positions: &[Position], selection: &CompanySelection) -> Vec<Position> {
    positions
        .iter()
        .zip(&selection.positions)
        .filter(|(_, sel)| sel.selected)
        .map(|(position, sel)| Position {
            responsibilities: pick(position.responsibilities.clone(), &sel.bullets),
            ..position.clone()
        })
        .collect()
}

fn select_projects(projects: Vec<Project>, selections: &[ProjectSelection]) -> Vec<Project> {
    projects
        .into_iter()
        .zip(selections)
        .filter(|(_, sel)| sel.selected)
        .map(|(project, sel)| Project {
            highlights: pick(project.highlights, &sel.highlights),
            ..project
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;
    use crate::overrides::target::{BasicsField, PositionField};
    use crate::overrides::TextOverride;

    #[test]
    fn test_master_view_is_the_master_tree() {
        let content = acme_resume();
        let view = resolve_view(&content, &SelectionState::all_selected(&content), None);
        assert_eq!(view, content);
    }

    #[test]
    fn test_deselected_items_are_dropped() {
        let content = acme_resume();
        let mut selections = SelectionState::all_selected(&content);
        selections.toggle_bullet("Acme", 0, 1).unwrap();
        selections.toggle_project_highlight(0, 0).unwrap();
        selections.toggle_skill(0).unwrap();

        let view = resolve_view(&content, &selections, None);
        let bullets: Vec<_> = view
            .work_experience
            .position("Acme", 0)
            .unwrap()
            .responsibilities
            .iter()
            .map(|r| r.text())
            .collect();
        assert_eq!(bullets, ["Led the platform team", "Mentored 5 engineers"]);
        assert_eq!(view.projects[0].highlights.len(), 1);
        assert_eq!(view.projects[0].highlights[0].text(), "Text overrides");
        assert!(view.skills.is_empty());
    }

    #[test]
    fn test_company_without_selected_positions_is_dropped() {
        let content = acme_resume();
        let mut selections = SelectionState::all_selected(&content);
        selections.toggle_position("Acme", 0).unwrap();
        let view = resolve_view(&content, &selections, None);
        assert!(view.work_experience.is_empty());
    }

    #[test]
    fn test_hidden_sections_are_empty() {
        let content = acme_resume();
        let mut selections = SelectionState::all_selected(&content);
        selections.toggle_section(SectionId::Summary);
        selections.toggle_section(SectionId::Awards);

        let view = resolve_view(&content, &selections, None);
        assert!(view.basics.summary.is_none());
        assert_eq!(view.basics.name, "Jane Doe");
        assert!(view.awards.is_empty());
        assert_eq!(view.education.len(), 1);
    }

    #[test]
    fn test_overrides_and_company_rename_apply() {
        let content = acme_resume();
        let selections = SelectionState::all_selected(&content);
        let mut overrides = TextOverrides::default();
        overrides.set(
            &OverrideTarget::CompanyName {
                company: "Acme".into(),
            },
            TextOverride::now("Acme Corp"),
        );
        overrides.set(
            &OverrideTarget::Position {
                company: "Acme".into(),
                position: 0,
                field: PositionField::JobTitle,
            },
            TextOverride::now("Principal Engineer"),
        );
        overrides.set(
            &OverrideTarget::Basics(BasicsField::Label),
            TextOverride::now("Platform Lead"),
        );

        let view = resolve_view(&content, &selections, Some(&overrides));
        let company = view.work_experience.iter().next().unwrap();
        assert_eq!(company.name, "Acme Corp");
        assert_eq!(company.positions[0].job_title, "Principal Engineer");
        assert_eq!(view.basics.label.as_deref(), Some("Platform Lead"));
        assert_eq!(content.basics.label.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_stale_override_is_inert() {
        let content = acme_resume();
        let mut overrides = TextOverrides::default();
        overrides.set(
            &OverrideTarget::Keyword { index: 5, keyword: 0 },
            TextOverride::now("COBOL"),
        );
        let view = resolve_view(
            &content,
            &SelectionState::all_selected(&content),
            Some(&overrides),
        );
        assert_eq!(view, content);
    }
}
