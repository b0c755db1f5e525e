use serde::Serialize;
use thiserror::Error;

const PAGE_BREAK: char = '\x0C';

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("no extractable text")]
    NoText,
}

/// Text pulled out of an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    /// Non-blank pages, in document order.
    pub pages: Vec<String>,
    /// Pages joined by a blank line.
    pub text: String,
}

impl ExtractedDocument {
    /// Splits extractor output on form feeds and drops blank pages.
    pub fn from_raw_text(raw: &str) -> Result<Self, IngestError> {
        let pages: Vec<String> = raw
            .split(PAGE_BREAK)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        if pages.is_empty() {
            return Err(IngestError::NoText);
        }

        let text = pages.join("\n\n");
        Ok(Self { pages, text })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// CPU-bound; call it from `spawn_blocking` inside async handlers.
pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))?;
    let document = ExtractedDocument::from_raw_text(&raw)?;
    tracing::debug!(
        "Extracted {} characters from {} PDF page(s)",
        document.text.len(),
        document.page_count()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let doc = ExtractedDocument::from_raw_text("Jane Doe\nEngineer\x0CEDUCATION\nMIT\x0C").unwrap();
        assert_eq!(doc.pages, vec!["Jane Doe\nEngineer", "EDUCATION\nMIT"]);
        assert_eq!(doc.text, "Jane Doe\nEngineer\n\nEDUCATION\nMIT");
    }

    #[test]
    fn test_blank_pages_dropped() {
        let doc = ExtractedDocument::from_raw_text("\x0C  \n\x0COnly page\x0C\x0C").unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.text, "Only page");
    }

    #[test]
    fn test_whitespace_only_is_no_text() {
        assert!(matches!(
            ExtractedDocument::from_raw_text(" \n\x0C\t"),
            Err(IngestError::NoText)
        ));
    }

    /// One page, standard Helvetica, drawing "Jane Doe".
    const ONE_PAGE_PDF: &[u8] = concat!(
        "%PDF-1.4\n",
        "1 0 obj\n",
        "<< /Type /Catalog /Pages 2 0 R >>\n",
        "endobj\n",
        "2 0 obj\n",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>\n",
        "endobj\n",
        "3 0 obj\n",
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>\n",
        "endobj\n",
        "4 0 obj\n",
        "<< /Length 39 >>\n",
        "stream\n",
        "BT /F1 24 Tf 72 720 Td (Jane Doe) Tj ET\n",
        "endstream\n",
        "endobj\n",
        "5 0 obj\n",
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\n",
        "endobj\n",
        "xref\n",
        "0 6\n",
        "0000000000 65535 f \n",
        "0000000009 00000 n \n",
        "0000000058 00000 n \n",
        "0000000115 00000 n \n",
        "0000000241 00000 n \n",
        "0000000330 00000 n \n",
        "trailer\n",
        "<< /Size 6 /Root 1 0 R >>\n",
        "startxref\n",
        "427\n",
        "%%EOF\n",
    )
    .as_bytes();

    #[test]
    fn test_extracts_text_from_single_page_pdf() {
        let doc = extract_pdf(ONE_PAGE_PDF).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.text.contains("Jane Doe"), "got {:?}", doc.text);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(extract_pdf(b"definitely not a pdf").is_err());
    }
}
