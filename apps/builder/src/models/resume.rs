//! Master resume content tree, as loaded from the YAML source document.
//!
//! The tree is the read-only baseline every version derives from. Only
//! push-to-master and the add-item operations mutate it after load.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Profile label every item added through the editor is tagged with.
pub const UNIVERSAL_TAG: &str = "all";

// ────────────────────────────────────────────────────────────────────────────
// Leaves
// ────────────────────────────────────────────────────────────────────────────

/// A responsibility or highlight line. The source document accepts either a
/// bare string or an object carrying its own `include_in` tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaggedText {
    Plain(String),
    Tagged {
        description: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        include_in: Vec<String>,
    },
}

impl TaggedText {
    pub fn text(&self) -> &str {
        match self {
            TaggedText::Plain(text) => text,
            TaggedText::Tagged { description, .. } => description,
        }
    }

    /// Replaces the text, keeping any tags.
    pub fn set_text(&mut self, value: &str) {
        match self {
            TaggedText::Plain(text) => *text = value.to_string(),
            TaggedText::Tagged { description, .. } => *description = value.to_string(),
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            TaggedText::Plain(_) => &[],
            TaggedText::Tagged { include_in, .. } => include_in,
        }
    }
}

impl From<&str> for TaggedText {
    fn from(text: &str) -> Self {
        TaggedText::Plain(text.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basics {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_info: Vec<ContactInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<SocialProfile>,
    /// Keys the editor does not model (`quote`, `image`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<TaggedText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honors: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<String>,
    #[serde(default, rename = "include_in", skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awarder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_like",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub highlights: Vec<TaggedText>,
    #[serde(default, rename = "include_in", skip_serializing_if = "Vec::is_empty")]
    pub include_in: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Work experience: company name -> positions, in document order
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Company {
    pub name: String,
    pub positions: Vec<Position>,
}

/// Companies keyed by name. Serialized as a mapping, but kept as a list so the
/// document order survives a load/export cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkExperience {
    companies: Vec<Company>,
}

impl WorkExperience {
    pub fn iter(&self) -> impl Iterator<Item = &Company> {
        self.companies.iter()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Company> {
        self.companies.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn position(&self, company: &str, index: usize) -> Option<&Position> {
        self.get(company).and_then(|c| c.positions.get(index))
    }

    pub fn position_mut(&mut self, company: &str, index: usize) -> Option<&mut Position> {
        self.get_mut(company).and_then(|c| c.positions.get_mut(index))
    }

    /// Appends a company. A duplicate name replaces nothing and is ignored;
    /// callers check `contains` first.
    pub fn push(&mut self, company: Company) {
        if !self.contains(&company.name) {
            self.companies.push(company);
        }
    }

    /// Drops companies for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&Company) -> bool) {
        self.companies.retain(keep);
    }
}

impl FromIterator<Company> for WorkExperience {
    fn from_iter<I: IntoIterator<Item = Company>>(iter: I) -> Self {
        let mut work = WorkExperience::default();
        for company in iter {
            work.push(company);
        }
        work
    }
}

impl Serialize for WorkExperience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.companies.len()))?;
        for company in &self.companies {
            map.serialize_entry(&company.name, &company.positions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WorkExperience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WorkVisitor;

        impl<'de> Visitor<'de> for WorkVisitor {
            type Value = WorkExperience;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of company name to a list of positions")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(WorkExperience::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut work = WorkExperience::default();
                while let Some((name, positions)) =
                    access.next_entry::<String, Option<Vec<Position>>>()?
                {
                    work.push(Company {
                        name,
                        positions: positions.unwrap_or_default(),
                    });
                }
                Ok(work)
            }
        }

        deserializer.deserialize_any(WorkVisitor)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document root
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default)]
    pub basics: Basics,
    #[serde(default)]
    pub work_experience: WorkExperience,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub awards: Vec<Award>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default, alias = "specialty_skills")]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Sections the editor does not model (meta, languages, interests, ...),
    /// carried through untouched. Every record below the root does the same
    /// for its own unmodelled keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ResumeData {
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Failed to parse resume YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize resume YAML")
    }
}

/// Loads the master resume document from disk.
pub fn load_resume(path: &Path) -> Result<ResumeData> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resume file {}", path.display()))?;
    ResumeData::from_yaml_str(&source)
        .with_context(|| format!("Invalid resume document {}", path.display()))
}

/// Ensures the universal profile label is present.
pub fn tag_universal(tags: &mut Vec<String>) {
    if !tags.iter().any(|t| t == UNIVERSAL_TAG) {
        tags.push(UNIVERSAL_TAG.to_string());
    }
}

/// Accepts strings as well as bare YAML numbers (`2019`, `3.8`) for fields
/// the document treats as text.
fn string_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringLike {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(
        Option::<StringLike>::deserialize(deserializer)?.map(|v| match v {
            StringLike::Text(s) => s,
            StringLike::Int(i) => i.to_string(),
            StringLike::Float(f) => f.to_string(),
        }),
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// One company ("Acme") with one three-bullet position, plus one entry
    /// in every flat section.
    pub fn acme_resume() -> ResumeData {
        ResumeData::from_yaml_str(
            r#"
basics:
  name: Jane Doe
  label: Engineer
  email: jane@example.com
  summary: Builds things.
work_experience:
  Acme:
    - job_title: Staff Engineer
      location: Remote
      start_date: 2020-01-01
      end_date: Present
      responsibilities:
        - Led the platform team
        - description: Cut build times by 40%
          include_in: [technical]
        - Mentored 5 engineers
      include_in: [all]
education:
  - institution: State University
    area: Computer Science
    studyType: BS
    startDate: 2010-09-01
    endDate: 2014-05-01
    courses: [Compilers, Databases]
    include_in: [all]
awards:
  - title: Hackathon Winner
    date: 2019-06-01
    awarder: Acme
certifications:
  - title: Certified Kubernetes Administrator
    acronym: CKA
    date: 2021-03-01
    url: https://example.com/cka
skills:
  - name: Languages
    keywords: [Rust, Go]
projects:
  - name: resume-builder
    description: Tooling for this very document
    startDate: 2023-01-01
    highlights:
      - Versioned selections
      - Text overrides
"#,
        )
        .expect("fixture parses")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::acme_resume;
    use super::*;

    #[test]
    fn test_loads_mixed_responsibility_shapes() {
        let resume = acme_resume();
        let position = resume.work_experience.position("Acme", 0).unwrap();
        assert_eq!(position.responsibilities.len(), 3);
        assert_eq!(position.responsibilities[1].text(), "Cut build times by 40%");
        assert_eq!(position.responsibilities[1].tags(), ["technical".to_string()]);
        assert!(position.responsibilities[0].tags().is_empty());
    }

    #[test]
    fn test_company_order_preserved() {
        let resume = ResumeData::from_yaml_str(
            "work_experience:\n  Zeta: []\n  Alpha: []\n  Mid: []\n",
        )
        .unwrap();
        let names: Vec<_> = resume.work_experience.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);

        let yaml = resume.to_yaml_string().unwrap();
        let again = ResumeData::from_yaml_str(&yaml).unwrap();
        let names: Vec<_> = again.work_experience.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_specialty_skills_alias() {
        let resume =
            ResumeData::from_yaml_str("specialty_skills:\n  - name: Cloud\n    keywords: [AWS]\n")
                .unwrap();
        assert_eq!(resume.skills[0].name, "Cloud");
    }

    #[test]
    fn test_numeric_scalars_read_as_text() {
        let resume = ResumeData::from_yaml_str(
            "education:\n  - institution: MIT\n    startDate: 2010\n    score: 3.8\n",
        )
        .unwrap();
        assert_eq!(resume.education[0].start_date.as_deref(), Some("2010"));
        assert_eq!(resume.education[0].score.as_deref(), Some("3.8"));
    }

    #[test]
    fn test_unknown_sections_survive_export() {
        let resume =
            ResumeData::from_yaml_str("basics:\n  name: A\nlanguages:\n  - English\n").unwrap();
        assert!(resume.extra.contains_key("languages"));
        let yaml = resume.to_yaml_string().unwrap();
        assert!(yaml.contains("languages"));
    }

    #[test]
    fn test_unmodelled_record_keys_survive_export() {
        let source = r#"
basics:
  name: A
  quote: Ship it.
  image: me.png
work_experience:
  Acme:
    - job_title: Engineer
      responsibilities: [Built things]
      projects:
        - name: Pipeline
education:
  - institution: MIT
    gpa_scale: 4
"#;
        let resume = ResumeData::from_yaml_str(source).unwrap();
        assert_eq!(
            resume.basics.extra.get("quote"),
            Some(&serde_yaml::Value::from("Ship it."))
        );

        let again = ResumeData::from_yaml_str(&resume.to_yaml_string().unwrap()).unwrap();
        assert_eq!(again, resume);
        assert!(again.basics.extra.contains_key("image"));
        let position = again.work_experience.position("Acme", 0).unwrap();
        assert!(position.extra.contains_key("projects"));
        assert!(again.education[0].extra.contains_key("gpa_scale"));
    }

    #[test]
    fn test_tag_universal_is_idempotent() {
        let mut tags = vec!["technical".to_string()];
        tag_universal(&mut tags);
        tag_universal(&mut tags);
        assert_eq!(tags, ["technical", "all"]);
    }

    #[test]
    fn test_push_ignores_duplicate_company() {
        let mut work = WorkExperience::default();
        work.push(Company {
            name: "Acme".into(),
            positions: vec![Position::default()],
        });
        work.push(Company {
            name: "Acme".into(),
            positions: vec![],
        });
        assert_eq!(work.len(), 1);
        assert_eq!(work.get("Acme").unwrap().positions.len(), 1);
    }
}
