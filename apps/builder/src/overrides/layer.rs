use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeData;
use crate::overrides::master::master_text;
use crate::overrides::target::{
    AwardField, BasicsField, CertificationField, EducationField, OverrideTarget, PositionField,
    ProjectField, SkillField,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverride {
    pub value: String,
    pub last_modified: DateTime<Utc>,
}

impl TextOverride {
    pub fn now(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            last_modified: Utc::now(),
        }
    }
}

/// Field overrides of one list item plus its nested string list
/// (courses, highlights or keywords, depending on the section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Ord + Deserialize<'de>"
))]
pub struct ItemOverrides<F: Ord> {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<F, TextOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<usize, TextOverride>,
}

impl<F: Ord> Default for ItemOverrides<F> {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            items: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOverrides {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<PositionField, TextOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bullets: BTreeMap<usize, TextOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TextOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub positions: BTreeMap<usize, PositionOverrides>,
}

/// Sparse per-version replacement text. A missing entry inherits the master
/// value. Entries are independent of selection: an override on a deselected
/// item is kept and simply has no effect until the item is selected again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverrides {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub basics: BTreeMap<BasicsField, TextOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub work_experience: BTreeMap<String, CompanyOverrides>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub education: BTreeMap<usize, ItemOverrides<EducationField>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub projects: BTreeMap<usize, ItemOverrides<ProjectField>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<usize, ItemOverrides<SkillField>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub awards: BTreeMap<usize, ItemOverrides<AwardField>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub certifications: BTreeMap<usize, ItemOverrides<CertificationField>>,
}

impl TextOverrides {
    pub fn get(&self, target: &OverrideTarget) -> Option<&TextOverride> {
        match target {
            OverrideTarget::Basics(field) => self.basics.get(field),
            OverrideTarget::CompanyName { company } => {
                self.work_experience.get(company)?.name.as_ref()
            }
            OverrideTarget::Position {
                company,
                position,
                field,
            } => self
                .work_experience
                .get(company)?
                .positions
                .get(position)?
                .fields
                .get(field),
            OverrideTarget::Bullet {
                company,
                position,
                bullet,
            } => self
                .work_experience
                .get(company)?
                .positions
                .get(position)?
                .bullets
                .get(bullet),
            OverrideTarget::Education { index, field } => self.education.get(index)?.fields.get(field),
            OverrideTarget::Course { index, course } => self.education.get(index)?.items.get(course),
            OverrideTarget::Project { index, field } => self.projects.get(index)?.fields.get(field),
            OverrideTarget::Highlight { index, highlight } => {
                self.projects.get(index)?.items.get(highlight)
            }
            OverrideTarget::Skill { index, field } => self.skills.get(index)?.fields.get(field),
            OverrideTarget::Keyword { index, keyword } => self.skills.get(index)?.items.get(keyword),
            OverrideTarget::Award { index, field } => self.awards.get(index)?.fields.get(field),
            OverrideTarget::Certification { index, field } => {
                self.certifications.get(index)?.fields.get(field)
            }
        }
    }

    /// Writes or replaces the override at `target`, creating intermediate
    /// containers on first write.
    pub fn set(&mut self, target: &OverrideTarget, value: TextOverride) {
        match target {
            OverrideTarget::Basics(field) => {
                self.basics.insert(*field, value);
            }
            OverrideTarget::CompanyName { company } => {
                self.work_experience.entry(company.clone()).or_default().name = Some(value);
            }
            OverrideTarget::Position {
                company,
                position,
                field,
            } => {
                self.work_experience
                    .entry(company.clone())
                    .or_default()
                    .positions
                    .entry(*position)
                    .or_default()
                    .fields
                    .insert(*field, value);
            }
            OverrideTarget::Bullet {
                company,
                position,
                bullet,
            } => {
                self.work_experience
                    .entry(company.clone())
                    .or_default()
                    .positions
                    .entry(*position)
                    .or_default()
                    .bullets
                    .insert(*bullet, value);
            }
            OverrideTarget::Education { index, field } => {
                self.education.entry(*index).or_default().fields.insert(*field, value);
            }
            OverrideTarget::Course { index, course } => {
                self.education.entry(*index).or_default().items.insert(*course, value);
            }
            OverrideTarget::Project { index, field } => {
                self.projects.entry(*index).or_default().fields.insert(*field, value);
            }
            OverrideTarget::Highlight { index, highlight } => {
                self.projects.entry(*index).or_default().items.insert(*highlight, value);
            }
            OverrideTarget::Skill { index, field } => {
                self.skills.entry(*index).or_default().fields.insert(*field, value);
            }
            OverrideTarget::Keyword { index, keyword } => {
                self.skills.entry(*index).or_default().items.insert(*keyword, value);
            }
            OverrideTarget::Award { index, field } => {
                self.awards.entry(*index).or_default().fields.insert(*field, value);
            }
            OverrideTarget::Certification { index, field } => {
                self.certifications
                    .entry(*index)
                    .or_default()
                    .fields
                    .insert(*field, value);
            }
        }
    }

    /// Deletes the override at `target`, returning it if there was one.
    /// Emptied intermediate containers stay in place.
    pub fn remove(&mut self, target: &OverrideTarget) -> Option<TextOverride> {
        match target {
            OverrideTarget::Basics(field) => self.basics.remove(field),
            OverrideTarget::CompanyName { company } => {
                self.work_experience.get_mut(company)?.name.take()
            }
            OverrideTarget::Position {
                company,
                position,
                field,
            } => self
                .work_experience
                .get_mut(company)?
                .positions
                .get_mut(position)?
                .fields
                .remove(field),
            OverrideTarget::Bullet {
                company,
                position,
                bullet,
            } => self
                .work_experience
                .get_mut(company)?
                .positions
                .get_mut(position)?
                .bullets
                .remove(bullet),
            OverrideTarget::Education { index, field } => {
                self.education.get_mut(index)?.fields.remove(field)
            }
            OverrideTarget::Course { index, course } => {
                self.education.get_mut(index)?.items.remove(course)
            }
            OverrideTarget::Project { index, field } => {
                self.projects.get_mut(index)?.fields.remove(field)
            }
            OverrideTarget::Highlight { index, highlight } => {
                self.projects.get_mut(index)?.items.remove(highlight)
            }
            OverrideTarget::Skill { index, field } => self.skills.get_mut(index)?.fields.remove(field),
            OverrideTarget::Keyword { index, keyword } => {
                self.skills.get_mut(index)?.items.remove(keyword)
            }
            OverrideTarget::Award { index, field } => self.awards.get_mut(index)?.fields.remove(field),
            OverrideTarget::Certification { index, field } => {
                self.certifications.get_mut(index)?.fields.remove(field)
            }
        }
    }

    /// Every override in the tree with the target it applies to.
    pub fn entries(&self) -> Vec<(OverrideTarget, &TextOverride)> {
        let mut out = Vec::new();
        for (field, value) in &self.basics {
            out.push((OverrideTarget::Basics(*field), value));
        }
        for (company, overrides) in &self.work_experience {
            if let Some(name) = &overrides.name {
                out.push((OverrideTarget::CompanyName { company: company.clone() }, name));
            }
            for (&position, p) in &overrides.positions {
                for (field, value) in &p.fields {
                    out.push((
                        OverrideTarget::Position {
                            company: company.clone(),
                            position,
                            field: *field,
                        },
                        value,
                    ));
                }
                for (&bullet, value) in &p.bullets {
                    out.push((
                        OverrideTarget::Bullet {
                            company: company.clone(),
                            position,
                            bullet,
                        },
                        value,
                    ));
                }
            }
        }
        flatten_items(
            &mut out,
            &self.education,
            |index, field| OverrideTarget::Education { index, field },
            |index, course| Some(OverrideTarget::Course { index, course }),
        );
        flatten_items(
            &mut out,
            &self.projects,
            |index, field| OverrideTarget::Project { index, field },
            |index, highlight| Some(OverrideTarget::Highlight { index, highlight }),
        );
        flatten_items(
            &mut out,
            &self.skills,
            |index, field| OverrideTarget::Skill { index, field },
            |index, keyword| Some(OverrideTarget::Keyword { index, keyword }),
        );
        flatten_items(
            &mut out,
            &self.awards,
            |index, field| OverrideTarget::Award { index, field },
            |_, _| None,
        );
        flatten_items(
            &mut out,
            &self.certifications,
            |index, field| OverrideTarget::Certification { index, field },
            |_, _| None,
        );
        out
    }
}

fn flatten_items<'a, F: Ord + Copy>(
    out: &mut Vec<(OverrideTarget, &'a TextOverride)>,
    section: &'a BTreeMap<usize, ItemOverrides<F>>,
    field_target: impl Fn(usize, F) -> OverrideTarget,
    item_target: impl Fn(usize, usize) -> Option<OverrideTarget>,
) {
    for (&index, item) in section {
        for (field, value) in &item.fields {
            out.push((field_target(index, *field), value));
        }
        for (&sub, value) in &item.items {
            if let Some(target) = item_target(index, sub) {
                out.push((target, value));
            }
        }
    }
}

/// The text a renderer shows for `target`: the version's override when one
/// exists, the master value otherwise. Selection state plays no part.
pub fn effective_text(
    content: &ResumeData,
    overrides: Option<&TextOverrides>,
    target: &OverrideTarget,
) -> Option<String> {
    overrides
        .and_then(|o| o.get(target))
        .map(|o| o.value.clone())
        .or_else(|| master_text(content, target))
}
