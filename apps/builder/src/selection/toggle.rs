//! Single-item toggles with parent/child propagation.
//!
//! Toggling a parent sets an absolute value (the negation of its current
//! `selected`) on itself and every descendant. Toggling a leaf flips it and
//! recomputes each ancestor as "any child selected". Partial patterns are only
//! reachable through leaf toggles; re-selecting a parent never restores one.

use serde::{Deserialize, Serialize};

use crate::errors::EditRejected;
use crate::selection::state::{SectionId, SelectionState};

/// One toggle request, as sent by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ToggleCommand {
    Section { section: SectionId },
    Company { company: String },
    Position { company: String, position: usize },
    Bullet { company: String, position: usize, bullet: usize },
    Project { project: usize },
    ProjectHighlight { project: usize, highlight: usize },
    Education { index: usize },
    Award { index: usize },
    Certification { index: usize },
    Skill { index: usize },
}

impl SelectionState {
    pub fn apply(&mut self, command: &ToggleCommand) -> Result<(), EditRejected> {
        match command {
            ToggleCommand::Section { section } => {
                self.toggle_section(*section);
                Ok(())
            }
            ToggleCommand::Company { company } => self.toggle_company(company),
            ToggleCommand::Position { company, position } => {
                self.toggle_position(company, *position)
            }
            ToggleCommand::Bullet {
                company,
                position,
                bullet,
            } => self.toggle_bullet(company, *position, *bullet),
            ToggleCommand::Project { project } => self.toggle_project(*project),
            ToggleCommand::ProjectHighlight { project, highlight } => {
                self.toggle_project_highlight(*project, *highlight)
            }
            ToggleCommand::Education { index } => self.toggle_education(*index),
            ToggleCommand::Award { index } => self.toggle_award(*index),
            ToggleCommand::Certification { index } => self.toggle_certification(*index),
            ToggleCommand::Skill { index } => self.toggle_skill(*index),
        }
    }

    /// Section visibility is independent of item state; nothing cascades.
    pub fn toggle_section(&mut self, section: SectionId) {
        let visible = self.sections.entry(section).or_insert(true);
        *visible = !*visible;
    }

    pub fn toggle_company(&mut self, company: &str) -> Result<(), EditRejected> {
        let selection = self
            .work_experience
            .get_mut(company)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("company '{company}'")))?;
        let value = !selection.selected;
        selection.set_all(value);
        Ok(())
    }

    pub fn toggle_position(&mut self, company: &str, position: usize) -> Result<(), EditRejected> {
        let selection = self
            .work_experience
            .get_mut(company)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("company '{company}'")))?;
        let target = selection.positions.get_mut(position).ok_or_else(|| {
            EditRejected::InvalidLocator(format!("position {position} of '{company}'"))
        })?;
        let value = !target.selected;
        target.set_all(value);
        selection.rollup();
        Ok(())
    }

    pub fn toggle_bullet(
        &mut self,
        company: &str,
        position: usize,
        bullet: usize,
    ) -> Result<(), EditRejected> {
        let selection = self
            .work_experience
            .get_mut(company)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("company '{company}'")))?;
        let target = selection.positions.get_mut(position).ok_or_else(|| {
            EditRejected::InvalidLocator(format!("position {position} of '{company}'"))
        })?;
        let flag = target.bullets.get_mut(bullet).ok_or_else(|| {
            EditRejected::InvalidLocator(format!(
                "bullet {bullet} of position {position} at '{company}'"
            ))
        })?;
        *flag = !*flag;
        target.rollup();
        selection.rollup();
        Ok(())
    }

    pub fn toggle_project(&mut self, project: usize) -> Result<(), EditRejected> {
        let target = self
            .projects
            .get_mut(project)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("project {project}")))?;
        let value = !target.selected;
        target.set_all(value);
        Ok(())
    }

    pub fn toggle_project_highlight(
        &mut self,
        project: usize,
        highlight: usize,
    ) -> Result<(), EditRejected> {
        let target = self
            .projects
            .get_mut(project)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("project {project}")))?;
        let flag = target.highlights.get_mut(highlight).ok_or_else(|| {
            EditRejected::InvalidLocator(format!("highlight {highlight} of project {project}"))
        })?;
        *flag = !*flag;
        target.rollup();
        Ok(())
    }

    pub fn toggle_education(&mut self, index: usize) -> Result<(), EditRejected> {
        flip(&mut self.education, index, "education")
    }

    pub fn toggle_award(&mut self, index: usize) -> Result<(), EditRejected> {
        flip(&mut self.awards, index, "awards")
    }

    pub fn toggle_certification(&mut self, index: usize) -> Result<(), EditRejected> {
        flip(&mut self.certifications, index, "certifications")
    }

    pub fn toggle_skill(&mut self, index: usize) -> Result<(), EditRejected> {
        flip(&mut self.skills, index, "skills")
    }
}

fn flip(flags: &mut [bool], index: usize, section: &str) -> Result<(), EditRejected> {
    let flag = flags
        .get_mut(index)
        .ok_or_else(|| EditRejected::InvalidLocator(format!("{section} item {index}")))?;
    *flag = !*flag;
    Ok(())
}
