//! Section header detection and section spans.
//!
//! A header is a short line made of an optional one- or two-word qualifier
//! followed by a section keyword (`EDUCATION`, `Professional Experience:`,
//! `Technical Skills`). It must either end with a colon or be capitalized,
//! which keeps ordinary sentences such as "led three projects" out.
//!
//! When a line matches more than one section pattern the first entry of
//! `SECTION_TABLE` wins, so every header belongs to exactly one section and
//! spans never overlap.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::chunk::SectionLabel;

const MAX_HEADER_CHARS: usize = 40;

/// Registration order doubles as emission order and as header precedence.
static SECTION_TABLE: LazyLock<Vec<(SectionLabel, Regex)>> = LazyLock::new(|| {
    [
        (
            SectionLabel::PersonalInfo,
            r"contact|contact info|contact information|contact details|personal info|personal information|personal details",
        ),
        (
            SectionLabel::Objective,
            r"objective|summary|profile|about me",
        ),
        (
            SectionLabel::Education,
            r"education|academics?|academic background|qualifications?",
        ),
        (
            SectionLabel::Experience,
            r"experience|employment|employment history|work history|career history|internships?",
        ),
        (
            SectionLabel::Skills,
            r"skills?|technologies|competenc(?:y|ies)|proficienc(?:y|ies)|tools",
        ),
        (SectionLabel::Projects, r"projects?|portfolio"),
        (
            SectionLabel::Certifications,
            r"certifications?|certificates?|licen[cs]es?",
        ),
    ]
    .into_iter()
    .map(|(label, keywords)| {
        let pattern = format!(r"(?i)^(?:[\w&/,-]+\s+){{0,2}}(?:{keywords})$");
        (label, Regex::new(&pattern).expect("valid section header regex"))
    })
    .collect()
});

/// The labels in registration order.
pub fn section_order() -> impl Iterator<Item = SectionLabel> {
    SECTION_TABLE.iter().map(|(label, _)| *label)
}

/// Returns the section a line introduces, if it is a header line.
pub fn section_header(line: &str) -> Option<SectionLabel> {
    let trimmed = line.trim();
    let has_colon = trimmed.ends_with(':');
    let candidate = trimmed.trim_end_matches(':').trim_end();

    if candidate.is_empty() || candidate.chars().count() > MAX_HEADER_CHARS {
        return None;
    }
    if !has_colon && !is_capitalized(candidate) {
        return None;
    }

    SECTION_TABLE
        .iter()
        .find(|(_, re)| re.is_match(candidate))
        .map(|(label, _)| *label)
}

fn is_capitalized(line: &str) -> bool {
    line.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphabetic()))
        .all(char::is_uppercase)
}

/// A header-delimited region of the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpan<'a> {
    pub label: SectionLabel,
    /// From the header line up to the next header line or end of text.
    pub text: &'a str,
}

/// Splits `text` at header lines. Text before the first header is not part
/// of any span.
pub fn section_spans(text: &str) -> Vec<SectionSpan<'_>> {
    let mut headers: Vec<(SectionLabel, usize)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some(label) = section_header(line) {
            headers.push((label, offset));
        }
        offset += line.len();
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, (label, start))| {
            let end = headers.get(i + 1).map(|(_, next)| *next).unwrap_or(text.len());
            SectionSpan {
                label: *label,
                text: &text[*start..end],
            }
        })
        .collect()
}
