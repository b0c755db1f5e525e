use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence boundary regex"));

/// Splits after `.`, `!` or `?` followed by whitespace. Sentences are
/// trimmed and empty ones dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(text) {
        // Keep the punctuation, drop the whitespace run.
        let end = boundary.start() + 1;
        sentences.push(text[start..end].trim());
        start = boundary.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// A run of consecutive sentences cut by the sliding window.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub content: String,
    pub sentence_count: usize,
    /// Leading sentences carried over from the previous window.
    pub overlap: usize,
}

struct Buffer<'a> {
    sentences: Vec<&'a str>,
    chars: usize,
    overlap: usize,
}

impl<'a> Buffer<'a> {
    fn seeded(carry: &[&'a str]) -> Self {
        let mut buffer = Buffer {
            sentences: Vec::new(),
            chars: 0,
            overlap: carry.len(),
        };
        for sentence in carry {
            buffer.push(sentence);
        }
        buffer
    }

    fn push(&mut self, sentence: &'a str) {
        if !self.sentences.is_empty() {
            self.chars += 1;
        }
        self.chars += sentence.chars().count();
        self.sentences.push(sentence);
    }

    fn has_fresh_sentences(&self) -> bool {
        self.sentences.len() > self.overlap
    }

    fn to_window(&self) -> Window {
        Window {
            content: self.sentences.join(" "),
            sentence_count: self.sentences.len(),
            overlap: self.overlap,
        }
    }
}

/// Packs sentences into windows of roughly `chunk_size` characters. Each
/// window after the first starts with the last `overlap_sentences` of the
/// one before it. The trailing window is kept only if it is longer than
/// `min_chunk_size`.
///
/// A buffer holding nothing but carried-over sentences is never emitted, so
/// a sentence longer than `chunk_size` yields an oversized window rather
/// than a repeat of the previous overlap.
pub fn sliding_windows(
    text: &str,
    chunk_size: usize,
    min_chunk_size: usize,
    overlap_sentences: usize,
) -> Vec<Window> {
    let mut windows = Vec::new();
    let mut buffer = Buffer::seeded(&[]);

    for sentence in split_sentences(text) {
        let would_be = buffer.chars + sentence.chars().count();
        if would_be > chunk_size && buffer.has_fresh_sentences() {
            windows.push(buffer.to_window());
            let keep = overlap_sentences.min(buffer.sentences.len());
            let carry = &buffer.sentences[buffer.sentences.len() - keep..];
            buffer = Buffer::seeded(carry);
        }
        buffer.push(sentence);
    }

    if buffer.has_fresh_sentences() && buffer.chars > min_chunk_size {
        windows.push(buffer.to_window());
    }
    windows
}
