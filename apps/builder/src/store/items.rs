//! Adding new items to the master tree.
//!
//! Each addition tags the item with the universal profile label and extends
//! every stored version's selection state with a selected entry, so the item
//! appears in all versions immediately.

use tracing::{info, warn};

use crate::errors::EditRejected;
use crate::models::resume::{
    tag_universal, Award, Certification, Company, Education, Position, Project, Skill,
};
use crate::store::ResumeStore;

impl ResumeStore {
    /// Adds a company with its initial positions.
    pub fn add_company(
        &mut self,
        name: impl Into<String>,
        mut positions: Vec<Position>,
    ) -> Result<(), EditRejected> {
        let name = name.into();
        if self.content.work_experience.contains(&name) {
            warn!("Company '{name}' already exists");
            return Err(EditRejected::DuplicateCompany(name));
        }
        for position in &mut positions {
            tag_universal(&mut position.include_in);
        }
        for version in &mut self.versions {
            version.selections.push_company(&name, &positions);
        }
        info!("Added company '{name}' with {} positions", positions.len());
        self.content.work_experience.push(Company { name, positions });
        Ok(())
    }

    /// Appends a position to an existing company. Returns its index.
    pub fn add_position(
        &mut self,
        company: &str,
        mut position: Position,
    ) -> Result<usize, EditRejected> {
        let target = self
            .content
            .work_experience
            .get_mut(company)
            .ok_or_else(|| EditRejected::InvalidLocator(format!("workExperience[{company}]")))?;
        tag_universal(&mut position.include_in);
        for version in &mut self.versions {
            version.selections.push_position(company, &position);
        }
        target.positions.push(position);
        let index = target.positions.len() - 1;
        info!("Added position {index} to '{company}'");
        Ok(index)
    }

    pub fn add_education(&mut self, mut education: Education) -> usize {
        tag_universal(&mut education.include_in);
        for version in &mut self.versions {
            version.selections.education.push(true);
        }
        self.content.education.push(education);
        self.content.education.len() - 1
    }

    pub fn add_project(&mut self, mut project: Project) -> usize {
        tag_universal(&mut project.include_in);
        for version in &mut self.versions {
            version.selections.push_project(&project);
        }
        self.content.projects.push(project);
        self.content.projects.len() - 1
    }

    pub fn add_skill(&mut self, mut skill: Skill) -> usize {
        tag_universal(&mut skill.include_in);
        for version in &mut self.versions {
            version.selections.skills.push(true);
        }
        self.content.skills.push(skill);
        self.content.skills.len() - 1
    }

    pub fn add_award(&mut self, mut award: Award) -> usize {
        tag_universal(&mut award.include_in);
        for version in &mut self.versions {
            version.selections.awards.push(true);
        }
        self.content.awards.push(award);
        self.content.awards.len() - 1
    }

    pub fn add_certification(&mut self, mut certification: Certification) -> usize {
        tag_universal(&mut certification.include_in);
        for version in &mut self.versions {
            version.selections.certifications.push(true);
        }
        self.content.certifications.push(certification);
        self.content.certifications.len() - 1
    }
}
