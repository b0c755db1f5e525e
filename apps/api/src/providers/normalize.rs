//! Maps model output onto `StructuredResume`.
//!
//! Models drift from the requested schema in small ways: numbers where strings
//! were asked for, `position` instead of `role`, skills grouped by category,
//! contact fields nested under `personal_info`. The mapping here is lenient
//! about all of these and ignores fields it does not know.

use serde_json::{Map, Value};
use tracing::debug;

use crate::llm_client::{interpret_output, ModelOutput};
use crate::models::provider::{ProviderKind, ProviderResult, RawOutput};
use crate::models::resume::{
    EducationEntry, ExperienceEntry, ProjectEntry, Provenance, StructuredResume, MODEL_JSON_METHOD,
    RAW_TEXT_METHOD,
};

/// Skill groups flattened first, in this order. Other groups follow by key.
const SKILL_GROUPS: &[&str] = &["technical", "languages", "tools", "soft"];

/// Interprets a model's text answer as a record, or passes it through raw.
pub fn result_from_model_text(provider: ProviderKind, model: &str, text: &str) -> ProviderResult {
    match interpret_output(text) {
        ModelOutput::Json(value) => {
            let provenance = Provenance::new(provider, Some(model), MODEL_JSON_METHOD);
            ProviderResult::Parsed(resume_from_value(&value, provenance))
        }
        ModelOutput::Raw(raw_output) => {
            debug!("{} model {} returned non-JSON output", provider, model);
            ProviderResult::RawText(RawOutput {
                raw_output,
                provenance: Provenance::new(provider, Some(model), RAW_TEXT_METHOD),
            })
        }
    }
}

pub fn resume_from_value(value: &Value, provenance: Provenance) -> StructuredResume {
    let mut record = StructuredResume::empty(provenance);
    let Some(root) = value.as_object() else {
        return record;
    };
    let personal = root.get("personal_info").and_then(Value::as_object);
    let contact = |key: &str| {
        text_field(root, &[key]).or_else(|| personal.and_then(|p| text_field(p, &[key])))
    };

    record.name = contact("name");
    record.email = contact("email");
    record.phone = contact("phone");
    record.summary = text_field(root, &["summary", "professional_summary", "objective"]);

    record.education = items(root.get("education"))
        .filter_map(education_entry)
        .collect();
    record.experience = items(root.get("experience"))
        .filter_map(experience_entry)
        .collect();
    record.projects = items(root.get("projects"))
        .filter_map(project_entry)
        .collect();
    record.certifications = items(root.get("certifications"))
        .filter_map(|v| lenient_text(v).or_else(|| v.as_object().and_then(|o| text_field(o, &["name", "title"]))))
        .collect();
    record.skills = skills(root.get("skills"));

    record
}

fn education_entry(value: &Value) -> Option<EducationEntry> {
    if let Some(line) = lenient_text(value) {
        return Some(EducationEntry::raw(&line));
    }
    let obj = value.as_object()?;
    let entry = EducationEntry {
        institution: text_field(obj, &["institution", "school", "university"]),
        degree: text_field(obj, &["degree"]),
        year: text_field(obj, &["year", "graduation_year"]),
        gpa: text_field(obj, &["gpa"]),
        raw_text: text_field(obj, &["raw_text"]),
    };
    (entry != EducationEntry::default()).then_some(entry)
}

fn experience_entry(value: &Value) -> Option<ExperienceEntry> {
    if let Some(line) = lenient_text(value) {
        return Some(ExperienceEntry::raw(&line));
    }
    let obj = value.as_object()?;

    let description = text_field(obj, &["description"]).or_else(|| {
        let bullets: Vec<String> = ["responsibilities", "achievements"]
            .iter()
            .flat_map(|key| items(obj.get(*key)).filter_map(lenient_text))
            .collect();
        (!bullets.is_empty()).then(|| bullets.join("; "))
    });

    let entry = ExperienceEntry {
        company: text_field(obj, &["company", "employer", "organization"]),
        role: text_field(obj, &["role", "position", "title"]),
        duration: text_field(obj, &["duration", "dates"]),
        description,
        raw_text: text_field(obj, &["raw_text"]),
    };
    (entry != ExperienceEntry::default()).then_some(entry)
}

fn project_entry(value: &Value) -> Option<ProjectEntry> {
    if let Some(name) = lenient_text(value) {
        return Some(ProjectEntry {
            name: Some(name),
            ..ProjectEntry::default()
        });
    }
    let obj = value.as_object()?;
    let entry = ProjectEntry {
        name: text_field(obj, &["name", "title"]),
        description: text_field(obj, &["description"]),
        technologies: string_list(obj.get("technologies")),
    };
    (entry != ProjectEntry::default()).then_some(entry)
}

/// Accepts a list, a comma-separated string or an object of category lists.
/// Case-insensitive duplicates are dropped, first spelling wins.
fn skills(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Object(groups)) => {
            let mut keys: Vec<&String> = groups.keys().collect();
            keys.sort_by_key(|k| {
                SKILL_GROUPS
                    .iter()
                    .position(|g| *g == k.as_str())
                    .unwrap_or(SKILL_GROUPS.len())
            });
            keys.into_iter()
                .flat_map(|k| string_list(groups.get(k)))
                .collect()
        }
        other => string_list(other),
    };

    let mut seen = Vec::new();
    let mut out = Vec::new();
    for skill in raw {
        let key = skill.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(skill);
        }
    }
    out
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        other => items(other).filter_map(lenient_text).collect(),
    }
}

fn items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

/// First non-empty text among `keys`.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(lenient_text))
}

/// Strings are trimmed, numbers stringified; everything else is absent.
fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null")).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
