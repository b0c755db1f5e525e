use serde::Serialize;

use crate::models::chunk::Chunk;

/// Chunks handed to the model as context.
pub const MAX_SOURCES: usize = 3;
const MIN_TERM_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "what", "which", "who", "whom", "whose", "this", "that",
    "these", "those", "with", "from", "have", "has", "had", "does", "did", "his", "her", "hers", "their",
    "they", "them", "you", "your", "about", "into", "how", "when", "where", "why", "can", "could", "would",
    "should", "will", "not", "any", "all", "there", "been", "being", "its", "our", "out", "than", "then",
    "also", "tell", "resume", "candidate",
];

/// A retrieved chunk and how many question terms it contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: usize,
}

/// Distinct lowercase terms of three or more characters, stop words removed.
pub fn question_terms(question: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in question.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#') {
        let word = word.to_lowercase();
        if word.chars().count() < MIN_TERM_CHARS || STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        if !terms.contains(&word) {
            terms.push(word);
        }
    }
    terms
}

fn score(chunk: &Chunk, terms: &[String]) -> usize {
    let content = chunk.content.to_lowercase();
    terms.iter().filter(|t| content.contains(t.as_str())).count()
}

/// Picks up to `MAX_SOURCES` chunks for `question`, best first.
///
/// Ties keep the order the chunks appear in `text`. Chunks with no matching
/// term are only returned when no chunk matches at all.
pub fn rank_chunks(question: &str, text: &str, chunks: Vec<Chunk>) -> Vec<ScoredChunk> {
    let terms = question_terms(question);

    let mut scored: Vec<(usize, ScoredChunk)> = chunks
        .into_iter()
        .map(|chunk| {
            let position = text.find(&chunk.content).unwrap_or(usize::MAX);
            let score = score(&chunk, &terms);
            (position, ScoredChunk { chunk, score })
        })
        .collect();

    if scored.iter().any(|(_, s)| s.score > 0) {
        scored.retain(|(_, s)| s.score > 0);
    }
    scored.sort_by(|(pos_a, a), (pos_b, b)| b.score.cmp(&a.score).then(pos_a.cmp(pos_b)));

    scored.into_iter().take(MAX_SOURCES).map(|(_, s)| s).collect()
}
