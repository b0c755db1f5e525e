// Document chunking for retrieval.
// Three strategies (sections, sliding window, pages) plus page attribution
// for chunks cut from the combined text.

pub mod attribution;
pub mod chunker;
pub mod sections;
pub mod window;

pub use chunker::{chunking_stats, ChunkConfig, DocumentChunker};
