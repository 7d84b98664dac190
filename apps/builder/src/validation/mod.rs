//! Schema checks for the master resume document.
//!
//! Checks run against the raw YAML tree rather than the typed model, so a
//! missing field is distinguishable from an empty one and a date written as a
//! bare number is reported instead of silently coerced. Problems never block
//! loading; they are logged at startup and served on demand.

pub mod handlers;

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;

use crate::models::resume::{ResumeData, UNIVERSAL_TAG};

/// Tags an `include_in` list may use.
pub const ALLOWED_TAGS: &[&str] = &[
    UNIVERSAL_TAG,
    "leadership",
    "management",
    "technical",
    "development",
    "consulting",
    "startup",
];

const DATE_PATTERN: &str = r"^([1-2][0-9]{3}(-[0-1][0-9](-[0-3][0-9])?)?|Present)$";
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const URL_PATTERN: &str = r"^https?://[a-zA-Z0-9.-]+(:[0-9]+)?(/.*)?$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Dotted location in the document, e.g. `work_experience.Acme[0].end_date`.
    pub field_path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(&self.warnings)
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push_error(path.into(), message.into(), None);
    }

    fn error_with(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.push_error(path.into(), message.into(), Some(suggestion.into()));
    }

    fn push_error(&mut self, field_path: String, message: String, suggestion: Option<String>) {
        self.errors.push(ValidationIssue {
            severity: Severity::Error,
            field_path,
            message,
            suggestion,
        });
    }

    fn warning(&mut self, path: String, message: &str, suggestion: &str) {
        self.warnings.push(ValidationIssue {
            severity: Severity::Warning,
            field_path: path,
            message: message.to_string(),
            suggestion: Some(suggestion.to_string()),
        });
    }
}

/// Reads and checks a resume file. Unreadable or unparsable files are errors
/// of the call, not entries in the report.
pub fn validate_file(path: &Path) -> Result<ValidationReport> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resume file {}", path.display()))?;
    let document: Value = serde_yaml::from_str(&source)
        .with_context(|| format!("Invalid resume document {}", path.display()))?;
    validate_document(&document)
}

/// Checks the in-memory master, including edits made since load.
pub fn validate_resume(resume: &ResumeData) -> Result<ValidationReport> {
    let document = serde_yaml::to_value(resume).context("Failed to serialize resume")?;
    validate_document(&document)
}

pub fn validate_document(document: &Value) -> Result<ValidationReport> {
    let mut validator = Validator::new()?;
    validator.document(document);
    Ok(validator.report)
}

struct Validator {
    date: Regex,
    email: Regex,
    url: Regex,
    report: ValidationReport,
}

impl Validator {
    fn new() -> Result<Self> {
        Ok(Self {
            date: Regex::new(DATE_PATTERN)?,
            email: Regex::new(EMAIL_PATTERN)?,
            url: Regex::new(URL_PATTERN)?,
            report: ValidationReport::default(),
        })
    }

    fn document(&mut self, doc: &Value) {
        if doc.is_null() {
            self.report.error("file", "YAML file is empty");
            return;
        }
        if doc.get("basics").is_none() {
            self.report.error_with(
                "root",
                "Missing required field: basics",
                "Add 'basics:' section to your resume",
            );
        }

        if let Some(basics) = doc.get("basics") {
            self.basics(basics);
        }
        if let Some(work) = doc.get("work_experience") {
            self.work_experience(work);
        }
        self.each(doc, "education", Self::education);
        self.each(doc, "awards", Self::award);
        self.each(doc, "certifications", Self::certification);
        self.each(doc, "projects", Self::project);
        self.each(doc, "volunteer", Self::volunteer);
        self.each(doc, "specialty_skills", Self::skill);
        self.each(doc, "skills", Self::skill);
    }

    /// Runs `check` on every entry of the list at `doc[key]`.
    fn each(&mut self, doc: &Value, key: &str, check: fn(&mut Self, &Value, &str)) {
        let Some(items) = doc.get(key).and_then(Value::as_sequence) else {
            return;
        };
        for (idx, item) in items.iter().enumerate() {
            check(self, item, &format!("{key}[{idx}]"));
        }
    }

    fn require(&mut self, value: &Value, path: &str, fields: &[&str]) {
        for field in fields {
            if value.get(*field).is_none() {
                self.report
                    .error(path, format!("Missing required field: {field}"));
            }
        }
    }

    fn basics(&mut self, basics: &Value) {
        if is_empty(basics) {
            return;
        }
        for field in ["name", "email"] {
            if basics.get(field).is_none() {
                self.report.error_with(
                    "basics",
                    format!("Missing required field: {field}"),
                    format!("Add 'basics.{field}' to your resume"),
                );
            }
        }

        if let Some(email) = non_empty_str(basics.get("email")) {
            if !self.email.is_match(email) {
                self.report.error_with(
                    "basics.email",
                    format!("Invalid email format: {email}"),
                    "Use format: user@example.com",
                );
            }
        }
        self.url_field(basics, "basics", "url", "Invalid URL format");

        if let Some(profiles) = basics.get("profiles").and_then(Value::as_sequence) {
            for (idx, profile) in profiles.iter().enumerate() {
                let path = format!("basics.profiles[{idx}]");
                self.require(profile, &path, &["network", "url"]);
                self.url_field(profile, &path, "url", "Invalid URL");
            }
        }
    }

    fn work_experience(&mut self, work: &Value) {
        if is_empty(work) {
            return;
        }
        let Some(companies) = work.as_mapping() else {
            self.report.error(
                "work_experience",
                "work_experience must be an object with company names as keys",
            );
            return;
        };

        for (company, positions) in companies {
            let company = key_name(company);
            let Some(positions) = positions.as_sequence() else {
                self.report.error(
                    format!("work_experience.{company}"),
                    "Company entry must be an array of positions",
                );
                continue;
            };
            for (idx, position) in positions.iter().enumerate() {
                self.position(position, &format!("work_experience.{company}[{idx}]"));
            }
        }
    }

    fn position(&mut self, position: &Value, path: &str) {
        self.require(position, path, &["job_title", "location", "start_date", "end_date"]);
        self.date_field(position, path, "start_date");
        self.date_field(position, path, "end_date");
        self.tags_field(position, path);
        self.tagged_texts(position, path, "responsibilities", "Responsibility");

        if let Some(projects) = position.get("projects").and_then(Value::as_sequence) {
            for (idx, project) in projects.iter().enumerate() {
                let path = format!("{path}.projects[{idx}]");
                self.require(project, &path, &["name", "description"]);
                self.tags_field(project, &path);
            }
        }
    }

    fn education(&mut self, entry: &Value, path: &str) {
        self.require(entry, path, &["institution", "area", "studyType", "startDate", "endDate"]);
        self.date_field(entry, path, "startDate");
        self.date_field(entry, path, "endDate");
        self.tags_field(entry, path);
    }

    fn award(&mut self, award: &Value, path: &str) {
        self.require(award, path, &["title", "date", "awarder"]);
        self.date_field(award, path, "date");
        self.tags_field(award, path);
    }

    fn certification(&mut self, cert: &Value, path: &str) {
        self.require(cert, path, &["title", "date", "url"]);
        if let Some(acronym) = cert.get("acronym").filter(|v| !v.is_null()) {
            if !acronym.is_string() {
                self.report
                    .error(format!("{path}.acronym"), "Acronym must be a string");
            }
        }
        self.date_field(cert, path, "date");
        self.url_field(cert, path, "url", "Invalid URL");
        self.url_field(cert, path, "badge_url", "Invalid badge URL");
        self.tags_field(cert, path);
    }

    fn project(&mut self, project: &Value, path: &str) {
        self.require(project, path, &["name", "description", "startDate", "roles", "type"]);
        self.date_field(project, path, "startDate");
        self.date_field(project, path, "endDate");
        self.url_field(project, path, "url", "Invalid URL");
        self.tags_field(project, path);
        self.tagged_texts(project, path, "highlights", "Highlight");
    }

    fn volunteer(&mut self, entry: &Value, path: &str) {
        self.require(entry, path, &["organization", "position", "startDate", "endDate"]);
        self.date_field(entry, path, "startDate");
        self.date_field(entry, path, "endDate");
        self.tags_field(entry, path);
    }

    fn skill(&mut self, skill: &Value, path: &str) {
        self.require(skill, path, &["name", "keywords"]);
        self.tags_field(skill, path);
    }

    /// Responsibilities and highlights: plain strings, or objects with a
    /// `description` and optional tags.
    fn tagged_texts(&mut self, parent: &Value, path: &str, key: &str, label: &str) {
        let Some(items) = parent.get(key).and_then(Value::as_sequence) else {
            return;
        };
        for (idx, item) in items.iter().enumerate() {
            let path = format!("{path}.{key}[{idx}]");
            if item.is_mapping() {
                if item.get("description").is_none() {
                    self.report.error(
                        &path,
                        format!("{label} object must have 'description' field"),
                    );
                }
                self.tags_field(item, &path);
            } else if !item.is_string() {
                self.report.error(
                    path,
                    format!("{label} must be a string or object with description and include_in"),
                );
            }
        }
    }

    fn date_field(&mut self, parent: &Value, path: &str, key: &str) {
        let Some(value) = parent.get(key) else {
            return;
        };
        let path = format!("{path}.{key}");
        let Some(date) = value.as_str() else {
            self.report.error(
                path,
                format!("Date must be a string, got {}", type_name(value)),
            );
            return;
        };
        if !self.date.is_match(date) {
            self.report.error_with(
                path,
                format!("Invalid date format: {date}"),
                "Use YYYY-MM-DD, YYYY-MM, YYYY, or 'Present'",
            );
        }
    }

    fn url_field(&mut self, parent: &Value, path: &str, key: &str, message: &str) {
        let Some(url) = non_empty_str(parent.get(key)) else {
            return;
        };
        if !self.url.is_match(url) {
            self.report.error_with(
                format!("{path}.{key}"),
                format!("{message}: {url}"),
                "URL must start with http:// or https://",
            );
        }
    }

    fn tags_field(&mut self, parent: &Value, path: &str) {
        let Some(tags) = parent.get("include_in") else {
            return;
        };
        let path = format!("{path}.include_in");
        let Some(tags) = tags.as_sequence() else {
            self.report.error_with(
                path,
                format!("include_in must be an array, got {}", type_name(tags)),
                "Use include_in: [all] or include_in: [leadership, technical]",
            );
            return;
        };
        if tags.is_empty() {
            self.report.error_with(
                path,
                "include_in array cannot be empty",
                "Use include_in: [all] for items that appear in all profiles",
            );
            return;
        }

        let names: Vec<String> = tags.iter().map(key_name).collect();
        let invalid: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|tag| !ALLOWED_TAGS.contains(tag))
            .collect();
        if !invalid.is_empty() {
            self.report.error_with(
                &path,
                format!("Invalid tags: {}", invalid.join(", ")),
                format!("Allowed tags: {}", ALLOWED_TAGS.join(", ")),
            );
        }
        if names.len() > 1 && names.iter().any(|t| t == UNIVERSAL_TAG) {
            self.report.warning(
                path,
                "Tag 'all' is present with other tags. The 'all' tag makes other tags redundant.",
                "Consider using just include_in: [all]",
            );
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(m) => m.is_empty(),
        Value::Sequence(s) => s.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Display form of a mapping key or tag, whatever its YAML type.
fn key_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "dict",
        Value::Tagged(_) => "tagged",
    }
}
