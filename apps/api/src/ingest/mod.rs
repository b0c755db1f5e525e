// Document ingest: PDF bytes to combined text plus per-page text.

pub mod pdf;

pub use pdf::{extract_pdf, ExtractedDocument, IngestError};
