use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::overrides::TextOverrides;
use crate::selection::SelectionState;

pub type VersionId = Uuid;

const MASTER: &str = "master";

/// Where a version's initial state was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BasedOn {
    Master,
    Version(VersionId),
}

impl fmt::Display for BasedOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasedOn::Master => f.write_str(MASTER),
            BasedOn::Version(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for BasedOn {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MASTER {
            return Ok(BasedOn::Master);
        }
        Uuid::parse_str(s).map(BasedOn::Version)
    }
}

impl TryFrom<String> for BasedOn {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BasedOn> for String {
    fn from(value: BasedOn) -> Self {
        value.to_string()
    }
}

/// The version edits are routed to. Master is virtual and never mutated.
///
/// Persisted as a nullable id (`null` = Master).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<VersionId>", into = "Option<VersionId>")]
pub enum ActiveTarget {
    #[default]
    Master,
    Version(VersionId),
}

impl ActiveTarget {
    pub fn version_id(&self) -> Option<VersionId> {
        match self {
            ActiveTarget::Master => None,
            ActiveTarget::Version(id) => Some(*id),
        }
    }
}

impl From<Option<VersionId>> for ActiveTarget {
    fn from(value: Option<VersionId>) -> Self {
        value.map_or(ActiveTarget::Master, ActiveTarget::Version)
    }
}

impl From<ActiveTarget> for Option<VersionId> {
    fn from(value: ActiveTarget) -> Self {
        value.version_id()
    }
}

/// A named, stored selection of master content with optional text overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeVersion {
    pub id: VersionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub based_on: BasedOn,
    pub selections: SelectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_overrides: Option<TextOverrides>,
}

impl ResumeVersion {
    pub fn new(
        name: String,
        description: Option<String>,
        based_on: BasedOn,
        selections: SelectionState,
        text_overrides: Option<TextOverrides>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: now,
            updated_at: now,
            based_on,
            selections,
            text_overrides,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_based_on_wire_format() {
        assert_eq!(serde_json::to_string(&BasedOn::Master).unwrap(), "\"master\"");
        let id = Uuid::new_v4();
        let json = serde_json::to_string(&BasedOn::Version(id)).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(
            serde_json::from_str::<BasedOn>(&json).unwrap(),
            BasedOn::Version(id)
        );
        assert!(serde_json::from_str::<BasedOn>("\"not-an-id\"").is_err());
    }

    #[test]
    fn test_active_target_persists_as_nullable_id() {
        assert_eq!(serde_json::to_string(&ActiveTarget::Master).unwrap(), "null");
        let id = Uuid::new_v4();
        let parsed: ActiveTarget = serde_json::from_str(&format!("\"{id}\"")).unwrap();
        assert_eq!(parsed, ActiveTarget::Version(id));
    }
}
