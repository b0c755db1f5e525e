use std::collections::BTreeMap;

use tracing::debug;

use super::attribution::PageIndex;
use super::sections::{section_order, section_spans};
use super::window::sliding_windows;
use crate::models::chunk::{Chunk, ChunkMetadata, ChunkStrategy, ChunkingStats, SectionLabel};

#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Target window size, in characters.
    pub chunk_size: usize,
    /// Chunks at or below this many characters are discarded.
    pub min_chunk_size: usize,
    pub overlap_sentences: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            min_chunk_size: 100,
            overlap_sentences: 2,
        }
    }
}

pub struct DocumentChunker {
    config: ChunkConfig,
}

impl DocumentChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Chunks `text` with the requested strategy. `pages` enables page
    /// attribution and is required by the page strategy, which otherwise
    /// falls back to sections.
    pub fn chunk(&self, text: &str, pages: Option<&[String]>, strategy: ChunkStrategy) -> Vec<Chunk> {
        let pages = pages.filter(|p| !p.is_empty());
        match (strategy, pages) {
            (ChunkStrategy::Pages, Some(pages)) => self.chunk_by_pages(pages),
            (ChunkStrategy::Pages, None) => {
                debug!("Page chunking requested without pages, using sections");
                self.chunk_by_sections(text, None)
            }
            (ChunkStrategy::Sliding, pages) => self.chunk_by_sliding_window(text, pages),
            (ChunkStrategy::Sections, pages) => self.chunk_by_sections(text, pages),
        }
    }

    /// One chunk per recognised section span, in section-table order.
    /// Falls back to the sliding window when no span is long enough.
    pub fn chunk_by_sections(&self, text: &str, pages: Option<&[String]>) -> Vec<Chunk> {
        let index = pages.map(PageIndex::new);
        let spans = section_spans(text);
        let mut chunks = Vec::new();

        for label in section_order() {
            for span in spans.iter().filter(|s| s.label == label) {
                let content = span.text.trim();
                let length = content.chars().count();
                if length <= self.config.min_chunk_size {
                    continue;
                }
                chunks.push(Chunk {
                    id: format!("{}_{}", label, chunks.len()),
                    content: content.to_string(),
                    section: label,
                    page: index.as_ref().map(|i| i.locate(content)),
                    metadata: ChunkMetadata {
                        length,
                        strategy: ChunkStrategy::Sections,
                        sentence_count: None,
                        overlap_sentences: None,
                    },
                });
            }
        }

        if chunks.is_empty() {
            debug!("No section chunks found, falling back to sliding window");
            return self.chunk_by_sliding_window(text, pages);
        }
        chunks
    }

    pub fn chunk_by_sliding_window(&self, text: &str, pages: Option<&[String]>) -> Vec<Chunk> {
        let index = pages.map(PageIndex::new);
        let ChunkConfig {
            chunk_size,
            min_chunk_size,
            overlap_sentences,
        } = self.config;

        sliding_windows(text, chunk_size, min_chunk_size, overlap_sentences)
            .into_iter()
            .enumerate()
            .map(|(n, window)| Chunk {
                id: format!("chunk_{n}"),
                page: index.as_ref().map(|i| i.locate(&window.content)),
                section: SectionLabel::General,
                metadata: ChunkMetadata {
                    length: window.content.chars().count(),
                    strategy: ChunkStrategy::Sliding,
                    sentence_count: Some(window.sentence_count),
                    overlap_sentences: Some(window.overlap),
                },
                content: window.content,
            })
            .collect()
    }

    /// One chunk per page longer than `min_chunk_size`; numbering stays
    /// aligned with the input even when pages are skipped.
    pub fn chunk_by_pages(&self, pages: &[String]) -> Vec<Chunk> {
        pages
            .iter()
            .enumerate()
            .filter_map(|(idx, page)| {
                let content = page.trim();
                if content.chars().count() <= self.config.min_chunk_size {
                    return None;
                }
                let number = idx + 1;
                Some(Chunk {
                    id: format!("page_{number}"),
                    content: content.to_string(),
                    section: SectionLabel::Page,
                    page: Some(number),
                    metadata: ChunkMetadata {
                        length: page.chars().count(),
                        strategy: ChunkStrategy::Pages,
                        sentence_count: None,
                        overlap_sentences: None,
                    },
                })
            })
            .collect()
    }
}

pub fn chunking_stats(chunks: &[Chunk]) -> ChunkingStats {
    if chunks.is_empty() {
        return ChunkingStats::default();
    }

    let total_content_length: usize = chunks.iter().map(|c| c.content.chars().count()).sum();
    let mut section_distribution = BTreeMap::new();
    for chunk in chunks {
        *section_distribution.entry(chunk.section).or_insert(0) += 1;
    }

    ChunkingStats {
        total_chunks: chunks.len(),
        average_length: total_content_length / chunks.len(),
        section_distribution,
        chunks_with_pages: chunks.iter().filter(|c| c.page.is_some()).count(),
        total_content_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(topic: &str) -> String {
        format!(
            "{topic} line one with enough words to matter for the chunker.\n\
             {topic} line two keeps going so the section clears the minimum size.\n"
        )
    }

    fn two_section_resume() -> String {
        format!(
            "Jane Doe\nEDUCATION\n{}EXPERIENCE\n{}",
            body("Campus"),
            body("Office")
        )
    }

    #[test]
    fn test_two_headers_give_two_disjoint_chunks() {
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk(&two_section_resume(), None, ChunkStrategy::Sections);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section, SectionLabel::Education);
        assert_eq!(chunks[1].section, SectionLabel::Experience);
        assert!(!chunks[0].content.contains("EXPERIENCE"));
        assert!(!chunks[1].content.contains("EDUCATION"));
        assert!(chunks[0].content.contains("Campus"));
        assert!(!chunks[0].content.contains("Office"));
        assert_eq!(chunks[0].id, "education_0");
        assert_eq!(chunks[1].id, "experience_1");
        assert!(chunks.iter().all(|c| c.page.is_none()));
    }

    #[test]
    fn test_sections_emitted_in_table_order() {
        let text = format!("SKILLS\n{}EDUCATION\n{}", body("Tooling"), body("Campus"));
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk_by_sections(&text, None);

        let labels: Vec<_> = chunks.iter().map(|c| c.section).collect();
        assert_eq!(labels, vec![SectionLabel::Education, SectionLabel::Skills]);
    }

    #[test]
    fn test_no_sections_falls_back_to_window() {
        let text = "no headers here. just one long paragraph of text that goes on and on. \
                    it keeps going well past the minimum chunk size so the window emits it.";
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk_by_sections(text, None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "chunk_0");
        assert_eq!(chunks[0].section, SectionLabel::General);
        assert_eq!(chunks[0].metadata.strategy, ChunkStrategy::Sliding);
    }

    #[test]
    fn test_page_strategy_without_pages_uses_sections() {
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk(&two_section_resume(), None, ChunkStrategy::Pages);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.strategy, ChunkStrategy::Sections);
    }

    #[test]
    fn test_page_chunks_skip_short_pages() {
        let pages = vec!["tiny".to_string(), body("Second page").repeat(2)];
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk("", Some(&pages), ChunkStrategy::Pages);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "page_2");
        assert_eq!(chunks[0].page, Some(2));
        assert_eq!(chunks[0].section, SectionLabel::Page);
    }

    #[test]
    fn test_section_chunks_attributed_to_pages() {
        let page_one = format!("Jane Doe\nEDUCATION\n{}", body("Campus"));
        let page_two = "EXPERIENCE\nShipped billing services at Acme Corp across three regions.\n\
                        Owned incident response rotations and quarterly reliability reviews.\n"
            .to_string();
        let text = format!("{page_one}{page_two}");
        let pages = vec![page_one, page_two];

        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk(&text, Some(&pages), ChunkStrategy::Sections);
        assert_eq!(chunks[0].page, Some(1));
        assert_eq!(chunks[1].page, Some(2));
    }

    #[test]
    fn test_window_chunks_carry_metadata() {
        let text: String = (0..20)
            .map(|i| format!("Sentence {i} is about shipping reliable services. "))
            .collect();
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let chunks = chunker.chunk(&text, None, ChunkStrategy::Sliding);

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].id, "chunk_0");
        assert_eq!(chunks[0].metadata.overlap_sentences, Some(0));
        assert_eq!(chunks[1].metadata.overlap_sentences, Some(2));
        assert!(chunks.iter().all(|c| c.metadata.sentence_count.is_some()));
    }

    #[test]
    fn test_stats() {
        let chunker = DocumentChunker::new(ChunkConfig::default());
        let page_one = two_section_resume();
        let pages = vec![page_one.clone()];
        let chunks = chunker.chunk(&page_one, Some(&pages), ChunkStrategy::Sections);
        let stats = chunking_stats(&chunks);

        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.chunks_with_pages, 2);
        assert_eq!(stats.section_distribution.get(&SectionLabel::Education), Some(&1));
        assert_eq!(
            stats.total_content_length,
            chunks.iter().map(|c| c.content.chars().count()).sum::<usize>()
        );
        assert_eq!(stats.average_length, stats.total_content_length / 2);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(chunking_stats(&[]), ChunkingStats::default());
    }
}
