//! Reading and writing a single text field of the master content tree.

use crate::errors::EditRejected;
use crate::models::resume::ResumeData;
use crate::overrides::target::{
    AwardField, BasicsField, CertificationField, EducationField, OverrideTarget, PositionField,
    ProjectField, SkillField,
};

/// The master value at `target`, or `None` when the item does not exist.
/// An existing but unset optional field reads as an empty string.
pub fn master_text(content: &ResumeData, target: &OverrideTarget) -> Option<String> {
    let text = match target {
        OverrideTarget::Basics(field) => {
            let basics = &content.basics;
            match field {
                BasicsField::Name => Some(basics.name.clone()),
                BasicsField::Label => basics.label.clone(),
                BasicsField::Email => basics.email.clone(),
                BasicsField::Phone => basics.phone.clone(),
                BasicsField::Url => basics.url.clone(),
                BasicsField::Summary => basics.summary.clone(),
                BasicsField::ShortSummary => basics.short_summary.clone(),
            }
        }
        OverrideTarget::CompanyName { company } => {
            return content.work_experience.get(company).map(|c| c.name.clone());
        }
        OverrideTarget::Position {
            company,
            position,
            field,
        } => {
            let p = content.work_experience.position(company, *position)?;
            match field {
                PositionField::JobTitle => Some(p.job_title.clone()),
                PositionField::Location => p.location.clone(),
                PositionField::StartDate => p.start_date.clone(),
                PositionField::EndDate => p.end_date.clone(),
            }
        }
        OverrideTarget::Bullet {
            company,
            position,
            bullet,
        } => {
            let p = content.work_experience.position(company, *position)?;
            return p.responsibilities.get(*bullet).map(|r| r.text().to_string());
        }
        OverrideTarget::Education { index, field } => {
            let e = content.education.get(*index)?;
            match field {
                EducationField::Institution => Some(e.institution.clone()),
                EducationField::Area => e.area.clone(),
                EducationField::StudyType => e.study_type.clone(),
                EducationField::StartDate => e.start_date.clone(),
                EducationField::EndDate => e.end_date.clone(),
                EducationField::Score => e.score.clone(),
                EducationField::Honors => e.honors.clone(),
            }
        }
        OverrideTarget::Course { index, course } => {
            return content.education.get(*index)?.courses.get(*course).cloned();
        }
        OverrideTarget::Project { index, field } => {
            let p = content.projects.get(*index)?;
            match field {
                ProjectField::Name => Some(p.name.clone()),
                ProjectField::Description => p.description.clone(),
                ProjectField::Url => p.url.clone(),
                ProjectField::StartDate => p.start_date.clone(),
                ProjectField::EndDate => p.end_date.clone(),
            }
        }
        OverrideTarget::Highlight { index, highlight } => {
            return content
                .projects
                .get(*index)?
                .highlights
                .get(*highlight)
                .map(|h| h.text().to_string());
        }
        OverrideTarget::Skill { index, field } => {
            let s = content.skills.get(*index)?;
            match field {
                SkillField::Name => Some(s.name.clone()),
                SkillField::Level => s.level.clone(),
            }
        }
        OverrideTarget::Keyword { index, keyword } => {
            return content.skills.get(*index)?.keywords.get(*keyword).cloned();
        }
        OverrideTarget::Award { index, field } => {
            let a = content.awards.get(*index)?;
            match field {
                AwardField::Title => Some(a.title.clone()),
                AwardField::Awarder => a.awarder.clone(),
                AwardField::Date => a.date.clone(),
                AwardField::Summary => a.summary.clone(),
            }
        }
        OverrideTarget::Certification { index, field } => {
            let c = content.certifications.get(*index)?;
            match field {
                CertificationField::Title => Some(c.title.clone()),
                CertificationField::Name => c.name.clone(),
                CertificationField::Acronym => c.acronym.clone(),
                CertificationField::Date => c.date.clone(),
                CertificationField::Url => c.url.clone(),
            }
        }
    };
    Some(text.unwrap_or_default())
}

/// Writes `value` into the master tree at `target`.
///
/// Company names double as work-experience keys, so a company display name
/// cannot be written here.
pub fn write_master(
    content: &mut ResumeData,
    target: &OverrideTarget,
    value: &str,
) -> Result<(), EditRejected> {
    let missing = || EditRejected::InvalidLocator(target.to_string());
    let text = value.to_string();

    match target {
        OverrideTarget::Basics(field) => {
            let basics = &mut content.basics;
            match field {
                BasicsField::Name => basics.name = text,
                BasicsField::Label => basics.label = Some(text),
                BasicsField::Email => basics.email = Some(text),
                BasicsField::Phone => basics.phone = Some(text),
                BasicsField::Url => basics.url = Some(text),
                BasicsField::Summary => basics.summary = Some(text),
                BasicsField::ShortSummary => basics.short_summary = Some(text),
            }
        }
        OverrideTarget::CompanyName { company } => {
            return Err(EditRejected::UnsupportedCompanyRename(company.clone()));
        }
        OverrideTarget::Position {
            company,
            position,
            field,
        } => {
            let p = content
                .work_experience
                .position_mut(company, *position)
                .ok_or_else(missing)?;
            match field {
                PositionField::JobTitle => p.job_title = text,
                PositionField::Location => p.location = Some(text),
                PositionField::StartDate => p.start_date = Some(text),
                PositionField::EndDate => p.end_date = Some(text),
            }
        }
        OverrideTarget::Bullet {
            company,
            position,
            bullet,
        } => content
            .work_experience
            .position_mut(company, *position)
            .and_then(|p| p.responsibilities.get_mut(*bullet))
            .ok_or_else(missing)?
            .set_text(value),
        OverrideTarget::Education { index, field } => {
            let e = content.education.get_mut(*index).ok_or_else(missing)?;
            match field {
                EducationField::Institution => e.institution = text,
                EducationField::Area => e.area = Some(text),
                EducationField::StudyType => e.study_type = Some(text),
                EducationField::StartDate => e.start_date = Some(text),
                EducationField::EndDate => e.end_date = Some(text),
                EducationField::Score => e.score = Some(text),
                EducationField::Honors => e.honors = Some(text),
            }
        }
        OverrideTarget::Course { index, course } => {
            *content
                .education
                .get_mut(*index)
                .and_then(|e| e.courses.get_mut(*course))
                .ok_or_else(missing)? = text;
        }
        OverrideTarget::Project { index, field } => {
            let p = content.projects.get_mut(*index).ok_or_else(missing)?;
            match field {
                ProjectField::Name => p.name = text,
                ProjectField::Description => p.description = Some(text),
                ProjectField::Url => p.url = Some(text),
                ProjectField::StartDate => p.start_date = Some(text),
                ProjectField::EndDate => p.end_date = Some(text),
            }
        }
        OverrideTarget::Highlight { index, highlight } => content
            .projects
            .get_mut(*index)
            .and_then(|p| p.highlights.get_mut(*highlight))
            .ok_or_else(missing)?
            .set_text(value),
        OverrideTarget::Skill { index, field } => {
            let s = content.skills.get_mut(*index).ok_or_else(missing)?;
            match field {
                SkillField::Name => s.name = text,
                SkillField::Level => s.level = Some(text),
            }
        }
        OverrideTarget::Keyword { index, keyword } => {
            *content
                .skills
                .get_mut(*index)
                .and_then(|s| s.keywords.get_mut(*keyword))
                .ok_or_else(missing)? = text;
        }
        OverrideTarget::Award { index, field } => {
            let a = content.awards.get_mut(*index).ok_or_else(missing)?;
            match field {
                AwardField::Title => a.title = text,
                AwardField::Awarder => a.awarder = Some(text),
                AwardField::Date => a.date = Some(text),
                AwardField::Summary => a.summary = Some(text),
            }
        }
        OverrideTarget::Certification { index, field } => {
            let c = content.certifications.get_mut(*index).ok_or_else(missing)?;
            match field {
                CertificationField::Title => c.title = text,
                CertificationField::Name => c.name = Some(text),
                CertificationField::Acronym => c.acronym = Some(text),
                CertificationField::Date => c.date = Some(text),
                CertificationField::Url => c.url = Some(text),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;

    #[test]
    fn test_write_bullet_keeps_tags() {
        let mut content = acme_resume();
        let target = OverrideTarget::Bullet {
            company: "Acme".into(),
            position: 0,
            bullet: 1,
        };
        write_master(&mut content, &target, "Cut build times by 55%").unwrap();
        let bullet = &content.work_experience.position("Acme", 0).unwrap().responsibilities[1];
        assert_eq!(bullet.text(), "Cut build times by 55%");
        assert_eq!(bullet.tags(), ["technical".to_string()]);
    }

    #[test]
    fn test_company_rename_is_unsupported() {
        let mut content = acme_resume();
        let before = content.clone();
        let result = write_master(
            &mut content,
            &OverrideTarget::CompanyName {
                company: "Acme".into(),
            },
            "Acme Corp",
        );
        assert_eq!(
            result,
            Err(EditRejected::UnsupportedCompanyRename("Acme".into()))
        );
        assert_eq!(content, before);
    }

    #[test]
    fn test_write_out_of_range_is_rejected() {
        let mut content = acme_resume();
        let before = content.clone();
        let result = write_master(
            &mut content,
            &OverrideTarget::Keyword { index: 0, keyword: 9 },
            "Zig",
        );
        assert!(matches!(result, Err(EditRejected::InvalidLocator(_))));
        assert_eq!(content, before);
    }

    #[test]
    fn test_unset_optional_reads_empty() {
        let content = acme_resume();
        let honors = OverrideTarget::Education {
            index: 0,
            field: EducationField::Honors,
        };
        assert_eq!(master_text(&content, &honors).as_deref(), Some(""));
        let missing = OverrideTarget::Education {
            index: 4,
            field: EducationField::Honors,
        };
        assert_eq!(master_text(&content, &missing), None);
    }

    #[test]
    fn test_write_optional_field() {
        let mut content = acme_resume();
        let target = OverrideTarget::Certification {
            index: 0,
            field: CertificationField::Acronym,
        };
        write_master(&mut content, &target, "CKA-2").unwrap();
        assert_eq!(master_text(&content, &target).as_deref(), Some("CKA-2"));
    }
}
