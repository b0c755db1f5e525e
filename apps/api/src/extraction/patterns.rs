//! Regex and keyword heuristics shared by the offline extractor and the
//! HuggingFace adapter.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

/// Ten digits in 3-3-4 groups, loosely delimited, optional `+1` prefix.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?1?[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}")
        .expect("valid phone regex")
});

static PHONE_TRIPLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone triplet regex"));

/// Vocabulary for the offline extractor.
pub const OFFLINE_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "sql",
    "html",
    "css",
    "machine learning",
    "data science",
    "aws",
    "docker",
    "kubernetes",
    "git",
    "github",
    "agile",
    "scrum",
    "tensorflow",
    "pytorch",
    "excel",
    "powerbi",
    "tableau",
    "mongodb",
    "postgresql",
];

/// Smaller vocabulary applied to HuggingFace free-text output.
pub const MODEL_TEXT_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "sql",
    "html",
    "css",
    "machine learning",
    "data science",
    "aws",
    "docker",
    "git",
];

/// Limits for picking a name out of the first lines of a resume.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pub lines_scanned: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub reject_phone_lines: bool,
    pub blocklist: &'static [&'static str],
}

pub const OFFLINE_NAME_RULE: NameRule = NameRule {
    lines_scanned: 5,
    min_chars: 4,
    max_chars: 49,
    reject_phone_lines: true,
    blocklist: &["@", "resume", "cv", "curriculum", "phone", "email"],
};

pub const MODEL_TEXT_NAME_RULE: NameRule = NameRule {
    lines_scanned: 5,
    min_chars: 3,
    max_chars: 49,
    reject_phone_lines: false,
    blocklist: &["@", "resume", "cv", "phone", "email"],
};

pub fn find_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First phone-like match, trimmed of the whitespace or separator it may
/// have picked up in front of the digits.
pub fn find_phone(text: &str) -> Option<String> {
    PHONE
        .find(text)
        .map(|m| m.as_str().trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '.'))
        .map(|s| s.trim_end().to_string())
        .filter(|s| !s.is_empty())
}

pub fn guess_name(text: &str, rule: &NameRule) -> Option<String> {
    text.lines()
        .take(rule.lines_scanned)
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            if len < rule.min_chars || len > rule.max_chars {
                return false;
            }
            let lower = line.to_lowercase();
            if rule.blocklist.iter().any(|word| lower.contains(word)) {
                return false;
            }
            !(rule.reject_phone_lines && PHONE_TRIPLET.is_match(line))
        })
        .map(str::to_string)
}

/// Case-insensitive substring match against `vocabulary`, reported in title
/// case and in vocabulary order.
pub fn match_skills(text: &str, vocabulary: &[&str], limit: Option<usize>) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for skill in vocabulary {
        if lower.contains(skill) {
            let titled = title_case(skill);
            if !found.contains(&titled) {
                found.push(titled);
            }
        }
    }
    if let Some(limit) = limit {
        found.truncate(limit);
    }
    found
}

/// Uppercases every letter that follows a non-letter, lowercases the rest:
/// `node.js` becomes `Node.Js`, `sql` becomes `Sql`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
