//! JSON export of a profile-filtered resume for site and API consumers.
//!
//! `include_in` tags only drive filtering, so they are stripped at every
//! depth, and an `export_meta` block records when and for which profile the
//! document was produced.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::models::resume::ResumeData;
use crate::profile::ProfileInfo;

pub const FORMAT_VERSION: &str = "1.0";

/// Serializes `resume` and removes every `include_in` key.
pub fn clean_resume_data(resume: &ResumeData) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(resume)?;
    strip_include_in(&mut value);
    Ok(value)
}

fn strip_include_in(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("include_in");
            map.values_mut().for_each(strip_include_in);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_include_in),
        _ => {}
    }
}

pub fn export_meta(profile: Option<&ProfileInfo>) -> Value {
    let mut meta = json!({
        "exported_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "generator": concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        "format_version": FORMAT_VERSION,
    });
    if let Some(info) = profile {
        meta["profile"] = json!({
            "name": info.name,
            "slug": info.slug,
            "description": info.description,
        });
    }
    meta
}

/// The cleaned document with `export_meta` attached at the root.
pub fn export_json(resume: &ResumeData, profile: &ProfileInfo) -> serde_json::Result<Value> {
    let mut value = clean_resume_data(resume)?;
    if let Value::Object(map) = &mut value {
        map.insert("export_meta".to_string(), export_meta(Some(profile)));
    }
    Ok(value)
}
