use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{find_email, find_phone, guess_name, match_skills, OFFLINE_NAME_RULE, OFFLINE_SKILLS};
use crate::chunking::sections::section_header;
use crate::models::resume::{EducationEntry, ExperienceEntry, Provenance, StructuredResume};

const MAX_EDUCATION_LINES: usize = 3;
const MAX_EXPERIENCE_LINES: usize = 5;

const EDUCATION_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "bachelor",
    "master",
    "phd",
    "degree",
    "diploma",
    "institute",
    "school",
];

/// Degree abbreviations are matched case-sensitively so "ms" or "ba" inside
/// ordinary words never count.
static DEGREE_ABBREVIATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[^\w.])(?:B\.?S\.?|B\.?A\.?|M\.?S\.?|MBA|Ph\.?D\.?|B\.?Tech|M\.?Tech|B\.?Sc|M\.?Sc|B\.?Eng|M\.?Eng)(?:$|[^\w])",
    )
    .expect("valid degree regex")
});

static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:19|20)\d{2}\s*[-–—]\s*(?:(?:19|20)\d{2}|present|current)\b")
        .expect("valid year range regex")
});

/// `Jan 2019 - Mar 2021`, `June 2020 – August 2022`.
static MONTH_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\s+\d{4}\s*[-–—]\s*\w+\s+\d{4}").expect("valid month range regex"));

/// Builds a record from `text` with regexes and keyword lists only.
/// Never fails: unmatched fields stay `None` or empty.
pub fn offline_extract(text: &str) -> StructuredResume {
    let mut record = StructuredResume::empty(Provenance::offline());

    record.email = find_email(text);
    record.phone = find_phone(text);
    record.name = guess_name(text, &OFFLINE_NAME_RULE);
    record.skills = match_skills(text, OFFLINE_SKILLS, None);

    let body_lines = || {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && section_header(line).is_none())
    };

    record.education = body_lines()
        .filter(|line| is_education_line(line))
        .take(MAX_EDUCATION_LINES)
        .map(EducationEntry::raw)
        .collect();

    record.experience = body_lines()
        .filter(|line| is_experience_line(line))
        .take(MAX_EXPERIENCE_LINES)
        .map(ExperienceEntry::raw)
        .collect();

    record
}

fn is_education_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k)) || DEGREE_ABBREVIATION.is_match(line)
}

fn is_experience_line(line: &str) -> bool {
    YEAR_RANGE.is_match(line) || MONTH_RANGE.is_match(line)
}
