//! Plain Markdown rendering of a resolved resume, used for the live preview.
//!
//! Sections are emitted in a fixed order and skipped when empty, so a hidden
//! or fully deselected section leaves no heading behind.

use chrono::NaiveDate;

use crate::models::resume::{Basics, Company, Education, Project, ResumeData};

pub fn render_markdown(resume: &ResumeData) -> String {
    let mut out = String::new();
    render_header(&mut out, &resume.basics);

    if let Some(summary) = resume.basics.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        section(&mut out, "Summary");
        out.push_str(&format!("{}\n", summary.trim()));
    }

    if !resume.work_experience.is_empty() {
        section(&mut out, "Experience");
        for company in resume.work_experience.iter() {
            render_company(&mut out, company);
        }
    }

    if !resume.projects.is_empty() {
        section(&mut out, "Projects");
        for project in &resume.projects {
            render_project(&mut out, project);
        }
    }

    if !resume.skills.is_empty() {
        section(&mut out, "Skills");
        for skill in &resume.skills {
            out.push_str(&format!("- **{}**", skill.name));
            if let Some(level) = &skill.level {
                out.push_str(&format!(" ({level})"));
            }
            if !skill.keywords.is_empty() {
                out.push_str(&format!(": {}", skill.keywords.join(", ")));
            }
            out.push('\n');
        }
    }

    if !resume.education.is_empty() {
        section(&mut out, "Education");
        for education in &resume.education {
            render_education(&mut out, education);
        }
    }

    if !resume.certifications.is_empty() {
        section(&mut out, "Certifications");
        for cert in &resume.certifications {
            out.push_str(&format!("- **{}**", cert.title));
            if let Some(acronym) = &cert.acronym {
                out.push_str(&format!(" ({acronym})"));
            }
            if let Some(date) = &cert.date {
                out.push_str(&format!(", {}", format_date(date)));
            }
            out.push('\n');
        }
    }

    if !resume.awards.is_empty() {
        section(&mut out, "Awards");
        for award in &resume.awards {
            out.push_str(&format!("- **{}**", award.title));
            if let Some(awarder) = &award.awarder {
                out.push_str(&format!(", {awarder}"));
            }
            if let Some(date) = &award.date {
                out.push_str(&format!(", {}", format_date(date)));
            }
            out.push('\n');
            if let Some(summary) = &award.summary {
                out.push_str(&format!("  {summary}\n"));
            }
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n## {title}\n\n"));
}

fn render_header(out: &mut String, basics: &Basics) {
    out.push_str(&format!("# {}\n", basics.name));
    if let Some(label) = &basics.label {
        out.push_str(&format!("\n_{label}_\n"));
    }

    let mut contact: Vec<&str> = [&basics.email, &basics.phone, &basics.url]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect();
    contact.extend(basics.profiles.iter().map(|p| p.url.as_str()));
    if !contact.is_empty() {
        out.push_str(&format!("\n{}\n", contact.join(" | ")));
    }
}

fn render_company(out: &mut String, company: &Company) {
    out.push_str(&format!("### {}\n\n", company.name));
    for position in &company.positions {
        out.push_str(&format!("**{}**", position.job_title));
        if let Some(location) = &position.location {
            out.push_str(&format!(" | {location}"));
        }
        if let Some(range) = date_range(&position.start_date, &position.end_date) {
            out.push_str(&format!(" | {range}"));
        }
        out.push_str("\n\n");
        for bullet in &position.responsibilities {
            out.push_str(&format!("- {}\n", bullet.text()));
        }
        if !position.responsibilities.is_empty() {
            out.push('\n');
        }
    }
}

fn render_project(out: &mut String, project: &Project) {
    out.push_str(&format!("### {}", project.name));
    if let Some(range) = date_range(&project.start_date, &project.end_date) {
        out.push_str(&format!(" ({range})"));
    }
    out.push_str("\n\n");
    if let Some(description) = &project.description {
        out.push_str(&format!("{description}\n\n"));
    }
    for highlight in &project.highlights {
        out.push_str(&format!("- {}\n", highlight.text()));
    }
    if let Some(url) = &project.url {
        out.push_str(&format!("\n<{url}>\n"));
    }
}

fn render_education(out: &mut String, education: &Education) {
    out.push_str(&format!("- **{}**", education.institution));
    let degree: Vec<&str> = [&education.study_type, &education.area]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect();
    if !degree.is_empty() {
        out.push_str(&format!(", {}", degree.join(" in ")));
    }
    if let Some(range) = date_range(&education.start_date, &education.end_date) {
        out.push_str(&format!(" ({range})"));
    }
    out.push('\n');
    if let Some(honors) = &education.honors {
        out.push_str(&format!("  {honors}\n"));
    }
    if !education.courses.is_empty() {
        out.push_str(&format!("  Courses: {}\n", education.courses.join(", ")));
    }
}

fn date_range(start: &Option<String>, end: &Option<String>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{} - {}", format_date(start), format_date(end))),
        (Some(start), None) => Some(format!("{} - Present", format_date(start))),
        (None, Some(end)) => Some(format_date(end)),
        (None, None) => None,
    }
}

/// `2020-01-15` and `2020-01` render as `Jan 2020`; anything else, such as
/// `Present` or a bare year, is shown unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::fixtures::acme_resume;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2020-01-15"), "Jan 2020");
        assert_eq!(format_date("2019-06"), "Jun 2019");
        assert_eq!(format_date("Present"), "Present");
        assert_eq!(format_date("2019"), "2019");
    }

    #[test]
    fn test_sections_in_order() {
        let markdown = render_markdown(&acme_resume());
        let order: Vec<usize> = [
            "## Summary",
            "## Experience",
            "## Projects",
            "## Skills",
            "## Education",
            "## Certifications",
            "## Awards",
        ]
        .iter()
        .map(|h| markdown.find(h).unwrap_or_else(|| panic!("missing {h}")))
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{markdown}");
    }

    #[test]
    fn test_renders_experience_details() {
        let markdown = render_markdown(&acme_resume());
        assert!(markdown.starts_with("# Jane Doe\n"));
        assert!(markdown.contains("### Acme"));
        assert!(markdown.contains("**Staff Engineer** | Remote | Jan 2020 - Present"));
        assert!(markdown.contains("- Cut build times by 40%"));
        assert!(markdown.contains("- **Languages**: Rust, Go"));
        assert!(markdown.contains("Courses: Compilers, Databases"));
    }

    #[test]
    fn test_empty_sections_have_no_heading() {
        let mut resume = acme_resume();
        resume.awards.clear();
        resume.basics.summary = None;
        let markdown = render_markdown(&resume);
        assert!(!markdown.contains("## Awards"));
        assert!(!markdown.contains("## Summary"));
    }
}
