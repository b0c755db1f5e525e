use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Section taxonomy for chunks. `General` marks window chunks, `Page` page chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    PersonalInfo,
    Objective,
    Education,
    Experience,
    Skills,
    Projects,
    Certifications,
    General,
    Page,
}

impl SectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::PersonalInfo => "personal_info",
            SectionLabel::Objective => "objective",
            SectionLabel::Education => "education",
            SectionLabel::Experience => "experience",
            SectionLabel::Skills => "skills",
            SectionLabel::Projects => "projects",
            SectionLabel::Certifications => "certifications",
            SectionLabel::General => "general",
            SectionLabel::Page => "page",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    #[default]
    Sections,
    Sliding,
    Pages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Length in characters of the buffer the chunk was cut from.
    pub length: usize,
    /// Strategy that actually produced the chunk (after any fallback).
    pub strategy: ChunkStrategy,
    pub sentence_count: Option<usize>,
    /// Leading sentences repeated from the previous window chunk.
    pub overlap_sentences: Option<usize>,
}

/// A bounded piece of the source document, tagged for retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub section: SectionLabel,
    pub page: Option<usize>,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub average_length: usize,
    pub section_distribution: BTreeMap<SectionLabel, usize>,
    pub chunks_with_pages: usize,
    pub total_content_length: usize,
}
