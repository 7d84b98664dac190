use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::resume::{Position, Project, ResumeData};

/// Top-level resume sections with an independent visibility switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionId {
    Summary,
    Experience,
    Projects,
    Skills,
    Education,
    Certifications,
    Awards,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::Summary,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Skills,
        SectionId::Education,
        SectionId::Certifications,
        SectionId::Awards,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSelection {
    pub selected: bool,
    /// One flag per responsibility of the position, in order.
    pub bullets: Vec<bool>,
}

impl PositionSelection {
    pub fn filled(bullets: usize, value: bool) -> Self {
        Self {
            selected: value,
            bullets: vec![value; bullets],
        }
    }

    pub fn set_all(&mut self, value: bool) {
        self.selected = value;
        self.bullets.iter_mut().for_each(|b| *b = value);
    }

    /// A position with bullets is selected iff any bullet is. A position with
    /// no bullets keeps whatever its own toggle last set.
    pub fn rollup(&mut self) {
        if !self.bullets.is_empty() {
            self.selected = self.bullets.iter().any(|&b| b);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySelection {
    pub selected: bool,
    pub positions: Vec<PositionSelection>,
}

impl CompanySelection {
    pub fn all_selected(positions: &[Position]) -> Self {
        Self {
            selected: true,
            positions: positions
                .iter()
                .map(|p| PositionSelection::filled(p.responsibilities.len(), true))
                .collect(),
        }
    }

    pub fn set_all(&mut self, value: bool) {
        self.selected = value;
        self.positions.iter_mut().for_each(|p| p.set_all(value));
    }

    pub fn rollup(&mut self) {
        if !self.positions.is_empty() {
            self.selected = self.positions.iter().any(|p| p.selected);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSelection {
    pub selected: bool,
    pub highlights: Vec<bool>,
}

impl ProjectSelection {
    pub fn filled(highlights: usize, value: bool) -> Self {
        Self {
            selected: value,
            highlights: vec![value; highlights],
        }
    }

    pub fn set_all(&mut self, value: bool) {
        self.selected = value;
        self.highlights.iter_mut().for_each(|h| *h = value);
    }

    pub fn rollup(&mut self) {
        if !self.highlights.is_empty() {
            self.selected = self.highlights.iter().any(|&h| h);
        }
    }
}

/// Per-version on/off projection over the master content tree.
///
/// Flat sections are indexed by the content tree's list index; positions are
/// indexed by their index under the owning company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub sections: BTreeMap<SectionId, bool>,
    pub work_experience: BTreeMap<String, CompanySelection>,
    #[serde(default)]
    pub education: Vec<bool>,
    #[serde(default)]
    pub awards: Vec<bool>,
    #[serde(default)]
    pub certifications: Vec<bool>,
    #[serde(default)]
    pub skills: Vec<bool>,
    #[serde(default)]
    pub projects: Vec<ProjectSelection>,
}

impl SelectionState {
    /// The state Master always presents: every section, item, bullet and
    /// highlight selected.
    pub fn all_selected(content: &ResumeData) -> Self {
        Self {
            sections: SectionId::ALL.iter().map(|&s| (s, true)).collect(),
            work_experience: content
                .work_experience
                .iter()
                .map(|c| (c.name.clone(), CompanySelection::all_selected(&c.positions)))
                .collect(),
            education: vec![true; content.education.len()],
            awards: vec![true; content.awards.len()],
            certifications: vec![true; content.certifications.len()],
            skills: vec![true; content.skills.len()],
            projects: content
                .projects
                .iter()
                .map(|p| ProjectSelection::filled(p.highlights.len(), true))
                .collect(),
        }
    }

    pub fn is_section_visible(&self, section: SectionId) -> bool {
        self.sections.get(&section).copied().unwrap_or(true)
    }

    pub fn company(&self, name: &str) -> Option<&CompanySelection> {
        self.work_experience.get(name)
    }

    #[cfg(test)]
    pub fn position(&self, company: &str, index: usize) -> Option<&PositionSelection> {
        self.company(company).and_then(|c| c.positions.get(index))
    }

    /// Adds selection entries for a newly created company.
    pub fn push_company(&mut self, name: &str, positions: &[Position]) {
        self.work_experience
            .entry(name.to_string())
            .or_insert_with(|| CompanySelection::all_selected(positions));
    }

    /// Adds a selected entry for a position appended to `company`.
    pub fn push_position(&mut self, company: &str, position: &Position) {
        let entry = self
            .work_experience
            .entry(company.to_string())
            .or_insert_with(|| CompanySelection {
                selected: true,
                positions: Vec::new(),
            });
        entry
            .positions
            .push(PositionSelection::filled(position.responsibilities.len(), true));
        entry.rollup();
    }

    pub fn push_project(&mut self, project: &Project) {
        self.projects
            .push(ProjectSelection::filled(project.highlights.len(), true));
    }

    /// Brings a stored state back in line with a freshly loaded content tree.
    ///
    /// Entries for items the tree gained are added as selected, entries past
    /// the end of the tree are dropped, and rollups are recomputed. Existing
    /// flags for items that are still present are kept.
    pub fn reconcile(&mut self, content: &ResumeData) {
        for section in SectionId::ALL {
            self.sections.entry(section).or_insert(true);
        }

        self.work_experience
            .retain(|name, _| content.work_experience.contains(name));
        for company in content.work_experience.iter() {
            let selection = self
                .work_experience
                .entry(company.name.clone())
                .or_insert_with(|| CompanySelection::all_selected(&company.positions));
            resize_with(&mut selection.positions, company.positions.len(), |i| {
                PositionSelection::filled(company.positions[i].responsibilities.len(), true)
            });
            for (position, source) in selection.positions.iter_mut().zip(&company.positions) {
                position.bullets.resize(source.responsibilities.len(), true);
                position.rollup();
            }
            selection.rollup();
        }

        self.education.resize(content.education.len(), true);
        self.awards.resize(content.awards.len(), true);
        self.certifications.resize(content.certifications.len(), true);
        self.skills.resize(content.skills.len(), true);

        resize_with(&mut self.projects, content.projects.len(), |i| {
            ProjectSelection::filled(content.projects[i].highlights.len(), true)
        });
        for (project, source) in self.projects.iter_mut().zip(&content.projects) {
            project.highlights.resize(source.highlights.len(), true);
            project.rollup();
        }
    }

    /// True when every map covers exactly the content tree's index space and
    /// every rollup agrees with its children.
    #[cfg(test)]
    pub fn is_consistent_with(&self, content: &ResumeData) -> bool {
        let companies_ok = self.work_experience.len() == content.work_experience.len()
            && content.work_experience.iter().all(|company| {
                self.company(&company.name).is_some_and(|sel| {
                    sel.positions.len() == company.positions.len()
                        && (sel.positions.is_empty()
                            || sel.selected == sel.positions.iter().any(|p| p.selected))
                        && sel.positions.iter().zip(&company.positions).all(|(p, src)| {
                            p.bullets.len() == src.responsibilities.len()
                                && (p.bullets.is_empty()
                                    || p.selected == p.bullets.iter().any(|&b| b))
                        })
                })
            });
        let projects_ok = self.projects.len() == content.projects.len()
            && self.projects.iter().zip(&content.projects).all(|(p, src)| {
                p.highlights.len() == src.highlights.len()
                    && (p.highlights.is_empty() || p.selected == p.highlights.iter().any(|&h| h))
            });
        companies_ok
            && projects_ok
            && self.education.len() == content.education.len()
            && self.awards.len() == content.awards.len()
            && self.certifications.len() == content.certifications.len()
            && self.skills.len() == content.skills.len()
    }
}

fn resize_with<T>(items: &mut Vec<T>, len: usize, mut make: impl FnMut(usize) -> T) {
    items.truncate(len);
    while items.len() < len {
        let next = make(items.len());
        items.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;

    #[test]
    fn test_master_state_selects_everything() {
        let content = acme_resume();
        let state = SelectionState::all_selected(&content);

        let acme = state.company("Acme").unwrap();
        assert!(acme.selected);
        assert_eq!(acme.positions.len(), 1);
        assert_eq!(acme.positions[0], PositionSelection::filled(3, true));
        assert_eq!(state.education, [true]);
        assert_eq!(state.skills, [true]);
        assert_eq!(state.projects[0].highlights, [true, true]);
        assert!(SectionId::ALL.iter().all(|&s| state.is_section_visible(s)));
        assert!(state.is_consistent_with(&content));
    }

    #[test]
    fn test_reconcile_pads_new_items_as_selected() {
        let mut content = acme_resume();
        let mut state = SelectionState::all_selected(&content);
        state.education[0] = false;

        content.education.push(Default::default());
        content
            .work_experience
            .get_mut("Acme")
            .unwrap()
            .positions[0]
            .responsibilities
            .push("Another".into());

        state.reconcile(&content);
        assert_eq!(state.education, [false, true]);
        assert_eq!(state.position("Acme", 0).unwrap().bullets.len(), 4);
        assert!(state.is_consistent_with(&content));
    }

    #[test]
    fn test_reconcile_drops_vanished_items() {
        let content = acme_resume();
        let mut state = SelectionState::all_selected(&content);
        state.push_company("Gone Inc", &[]);
        state.skills.push(false);

        state.reconcile(&content);
        assert!(state.company("Gone Inc").is_none());
        assert_eq!(state.skills.len(), 1);
        assert!(state.is_consistent_with(&content));
    }

    #[test]
    fn test_reconcile_recomputes_rollups() {
        let content = acme_resume();
        let mut state = SelectionState::all_selected(&content);
        let acme = state.work_experience.get_mut("Acme").unwrap();
        acme.positions[0].bullets = vec![false, false, false];

        state.reconcile(&content);
        assert!(!state.position("Acme", 0).unwrap().selected);
        assert!(!state.company("Acme").unwrap().selected);
    }

    #[test]
    fn test_missing_section_key_reads_visible() {
        let content = acme_resume();
        let mut state = SelectionState::all_selected(&content);
        state.sections.clear();
        assert!(state.is_section_visible(SectionId::Awards));
    }
}
