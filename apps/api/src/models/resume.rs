use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::provider::ProviderKind;

/// The normalized record every provider produces, whichever backend ran.
///
/// Every field is always serialized. Missing values are `null` or `[]`, never
/// omitted, so a renderer can rely on key presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub provenance: Provenance,
}

impl StructuredResume {
    /// A record with every field empty, attributed to `provenance`.
    pub fn empty(provenance: Provenance) -> Self {
        Self {
            name: None,
            email: None,
            phone: None,
            summary: None,
            education: Vec::new(),
            experience: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            provenance,
        }
    }

    /// File name offered when the record is exported for download.
    pub fn export_file_name(&self) -> String {
        let stem = self
            .name
            .as_deref()
            .map(|n| {
                n.chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                    .collect::<String>()
            })
            .filter(|s| s.chars().any(|c| c != '_'))
            .unwrap_or_else(|| "resume".to_string());
        format!("parsed_resume_{stem}.json")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<String>,
    /// Verbatim source line when the entry came from keyword matching.
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl EducationEntry {
    pub fn raw(line: &str) -> Self {
        Self {
            raw_text: Some(line.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

impl ExperienceEntry {
    pub fn raw(line: &str) -> Self {
        Self {
            raw_text: Some(line.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Parsing method label for records built without any model.
pub const OFFLINE_METHOD: &str = "offline_basic";
/// Parsing method label for records decoded from model JSON.
pub const MODEL_JSON_METHOD: &str = "model_json";
/// Parsing method label for records assembled by local heuristics over model text.
pub const MODEL_HEURISTIC_METHOD: &str = "model_text_heuristic";
/// Parsing method label for model text passed through undecoded.
pub const RAW_TEXT_METHOD: &str = "raw_text";

/// Which backend produced a record, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub parsing_method: String,
    pub fallback_reason: Option<String>,
    /// Free-text commentary from models that do not emit JSON, truncated.
    pub analysis: Option<String>,
    pub parsed_at: DateTime<Utc>,
}

impl Provenance {
    pub fn new(provider: ProviderKind, model: Option<&str>, parsing_method: &str) -> Self {
        Self {
            provider,
            model: model.map(str::to_string),
            parsing_method: parsing_method.to_string(),
            fallback_reason: None,
            analysis: None,
            parsed_at: Utc::now(),
        }
    }

    pub fn offline() -> Self {
        Self::new(ProviderKind::Offline, None, OFFLINE_METHOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_every_key() {
        let record = StructuredResume::empty(Provenance::offline());
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "name",
            "email",
            "phone",
            "summary",
            "education",
            "experience",
            "skills",
            "projects",
            "certifications",
            "provenance",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert!(json["name"].is_null());
        assert_eq!(json["skills"], serde_json::json!([]));
        assert!(json["provenance"]["fallback_reason"].is_null());
    }

    #[test]
    fn test_raw_education_entry_keeps_other_fields_null() {
        let entry = EducationEntry::raw("MIT, BS 2016");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["raw_text"], "MIT, BS 2016");
        assert!(json["institution"].is_null());
        assert!(json["gpa"].is_null());
    }

    #[test]
    fn test_export_file_name_uses_slugged_name() {
        let mut record = StructuredResume::empty(Provenance::offline());
        record.name = Some("Jane Doe".to_string());
        assert_eq!(record.export_file_name(), "parsed_resume_jane_doe.json");
    }

    #[test]
    fn test_export_file_name_without_name() {
        let record = StructuredResume::empty(Provenance::offline());
        assert_eq!(record.export_file_name(), "parsed_resume_resume.json");
    }

    #[test]
    fn test_offline_provenance_labels() {
        let p = Provenance::offline();
        assert_eq!(p.provider, ProviderKind::Offline);
        assert_eq!(p.parsing_method, OFFLINE_METHOD);
        assert!(p.model.is_none());
    }
}
