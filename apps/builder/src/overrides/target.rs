//! Addressing of overridable text fields.
//!
//! The editor names a field with a dotted path (`education.institution`,
//! `workExperience.bullets`) plus the indices that path needs. Both are parsed
//! once into an `OverrideTarget`, which every other override operation uses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::EditRejected;

macro_rules! text_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant),+
        }

        impl $name {
            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn parse(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

text_fields!(BasicsField {
    Name => "name",
    Label => "label",
    Email => "email",
    Phone => "phone",
    Url => "url",
    Summary => "summary",
    ShortSummary => "short_summary",
});

text_fields!(PositionField {
    JobTitle => "job_title",
    Location => "location",
    StartDate => "start_date",
    EndDate => "end_date",
});

text_fields!(EducationField {
    Institution => "institution",
    Area => "area",
    StudyType => "studyType",
    StartDate => "startDate",
    EndDate => "endDate",
    Score => "score",
    Honors => "honors",
});

text_fields!(ProjectField {
    Name => "name",
    Description => "description",
    Url => "url",
    StartDate => "startDate",
    EndDate => "endDate",
});

text_fields!(SkillField {
    Name => "name",
    Level => "level",
});

text_fields!(AwardField {
    Title => "title",
    Awarder => "awarder",
    Date => "date",
    Summary => "summary",
});

text_fields!(CertificationField {
    Title => "title",
    Name => "name",
    Acronym => "acronym",
    Date => "date",
    Url => "url",
});

/// Index arguments accompanying a dotted path. Which ones are required
/// depends on the path's section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideIndices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_index: Option<usize>,
}

/// A single overridable text field of the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    Basics(BasicsField),
    /// Display name of a company. Overridable per version, never pushable.
    CompanyName { company: String },
    Position { company: String, position: usize, field: PositionField },
    Bullet { company: String, position: usize, bullet: usize },
    Education { index: usize, field: EducationField },
    Course { index: usize, course: usize },
    Project { index: usize, field: ProjectField },
    Highlight { index: usize, highlight: usize },
    Skill { index: usize, field: SkillField },
    Keyword { index: usize, keyword: usize },
    Award { index: usize, field: AwardField },
    Certification { index: usize, field: CertificationField },
}

impl OverrideTarget {
    pub fn parse(path: &str, indices: &OverrideIndices) -> Result<Self, EditRejected> {
        let unknown = || EditRejected::UnknownOverridePath(path.to_string());
        let (section, field) = path.split_once('.').ok_or_else(unknown)?;

        let missing = |name: &str| EditRejected::InvalidLocator(format!("{path} requires {name}"));
        let company = || indices.company.clone().ok_or_else(|| missing("company"));
        let position = || indices.position_index.ok_or_else(|| missing("positionIndex"));
        let index = || indices.index.ok_or_else(|| missing("index"));
        let sub_index = || indices.sub_index.ok_or_else(|| missing("subIndex"));

        let target = match (section, field) {
            ("basics", f) => OverrideTarget::Basics(BasicsField::parse(f).ok_or_else(unknown)?),
            ("workExperience", "company") => OverrideTarget::CompanyName { company: company()? },
            ("workExperience", "bullets") => OverrideTarget::Bullet {
                company: company()?,
                position: position()?,
                bullet: indices.bullet_index.ok_or_else(|| missing("bulletIndex"))?,
            },
            ("workExperience", f) => OverrideTarget::Position {
                field: PositionField::parse(f).ok_or_else(unknown)?,
                company: company()?,
                position: position()?,
            },
            ("education", "courses") => OverrideTarget::Course {
                index: index()?,
                course: sub_index()?,
            },
            ("education", f) => OverrideTarget::Education {
                field: EducationField::parse(f).ok_or_else(unknown)?,
                index: index()?,
            },
            ("projects", "highlights") => OverrideTarget::Highlight {
                index: index()?,
                highlight: sub_index()?,
            },
            ("projects", f) => OverrideTarget::Project {
                field: ProjectField::parse(f).ok_or_else(unknown)?,
                index: index()?,
            },
            ("skills", "keywords") => OverrideTarget::Keyword {
                index: index()?,
                keyword: sub_index()?,
            },
            ("skills", f) => OverrideTarget::Skill {
                field: SkillField::parse(f).ok_or_else(unknown)?,
                index: index()?,
            },
            ("awards", f) => OverrideTarget::Award {
                field: AwardField::parse(f).ok_or_else(unknown)?,
                index: index()?,
            },
            ("certifications", f) => OverrideTarget::Certification {
                field: CertificationField::parse(f).ok_or_else(unknown)?,
                index: index()?,
            },
            _ => return Err(unknown()),
        };
        Ok(target)
    }
}

impl fmt::Display for OverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideTarget::Basics(field) => write!(f, "basics.{}", field.key()),
            OverrideTarget::CompanyName { company } => write!(f, "workExperience[{company}].company"),
            OverrideTarget::Position {
                company,
                position,
                field,
            } => write!(f, "workExperience[{company}][{position}].{}", field.key()),
            OverrideTarget::Bullet {
                company,
                position,
                bullet,
            } => write!(f, "workExperience[{company}][{position}].bullets[{bullet}]"),
            OverrideTarget::Education { index, field } => {
                write!(f, "education[{index}].{}", field.key())
            }
            OverrideTarget::Course { index, course } => {
                write!(f, "education[{index}].courses[{course}]")
            }
            OverrideTarget::Project { index, field } => {
                write!(f, "projects[{index}].{}", field.key())
            }
            OverrideTarget::Highlight { index, highlight } => {
                write!(f, "projects[{index}].highlights[{highlight}]")
            }
            OverrideTarget::Skill { index, field } => write!(f, "skills[{index}].{}", field.key()),
            OverrideTarget::Keyword { index, keyword } => {
                write!(f, "skills[{index}].keywords[{keyword}]")
            }
            OverrideTarget::Award { index, field } => write!(f, "awards[{index}].{}", field.key()),
            OverrideTarget::Certification { index, field } => {
                write!(f, "certifications[{index}].{}", field.key())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize) -> OverrideIndices {
        OverrideIndices {
            index: Some(index),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_flat_field() {
        assert_eq!(
            OverrideTarget::parse("education.institution", &at(0)).unwrap(),
            OverrideTarget::Education {
                index: 0,
                field: EducationField::Institution
            }
        );
    }

    #[test]
    fn test_parse_nested_work_paths() {
        let indices = OverrideIndices {
            company: Some("Acme".into()),
            position_index: Some(1),
            bullet_index: Some(2),
            ..Default::default()
        };
        assert_eq!(
            OverrideTarget::parse("workExperience.bullets", &indices).unwrap(),
            OverrideTarget::Bullet {
                company: "Acme".into(),
                position: 1,
                bullet: 2
            }
        );
        assert_eq!(
            OverrideTarget::parse("workExperience.job_title", &indices).unwrap(),
            OverrideTarget::Position {
                company: "Acme".into(),
                position: 1,
                field: PositionField::JobTitle
            }
        );
    }

    #[test]
    fn test_parse_sub_item_paths() {
        let indices = OverrideIndices {
            index: Some(0),
            sub_index: Some(3),
            ..Default::default()
        };
        assert_eq!(
            OverrideTarget::parse("skills.keywords", &indices).unwrap(),
            OverrideTarget::Keyword {
                index: 0,
                keyword: 3
            }
        );
        assert_eq!(
            OverrideTarget::parse("education.courses", &indices).unwrap(),
            OverrideTarget::Course { index: 0, course: 3 }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_paths() {
        for path in ["education", "education.gpa", "volunteer.organization", "basics."] {
            assert!(
                matches!(
                    OverrideTarget::parse(path, &at(0)),
                    Err(EditRejected::UnknownOverridePath(_))
                ),
                "{path}"
            );
        }
    }

    #[test]
    fn test_parse_requires_indices() {
        assert!(matches!(
            OverrideTarget::parse("awards.title", &OverrideIndices::default()),
            Err(EditRejected::InvalidLocator(_))
        ));
        assert!(matches!(
            OverrideTarget::parse("projects.highlights", &at(0)),
            Err(EditRejected::InvalidLocator(_))
        ));
    }

    #[test]
    fn test_field_keys_round_trip() {
        for key in ["institution", "area", "studyType", "startDate", "endDate", "score", "honors"] {
            assert_eq!(EducationField::parse(key).unwrap().key(), key);
        }
        assert_eq!(
            serde_json::to_string(&BasicsField::ShortSummary).unwrap(),
            "\"short_summary\""
        );
    }
}
