//! PDF text extraction

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Text extracted from an uploaded file
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Extracted text content
    pub content: String,
    /// Total pages (if known)
    pub total_pages: Option<u32>,
}

/// Turns uploaded bytes into raw text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract all text from the file
    async fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedText>;

    /// Get extractor name for logging
    fn name(&self) -> &str;
}

/// PDF extractor backed by pdf-extract, with lopdf for page counting
#[derive(Debug, Default, Clone)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Reject anything that does not carry the PDF header
    pub fn ensure_pdf(filename: &str, data: &[u8]) -> Result<()> {
        // Some producers emit a few junk bytes before the header
        let window = &data[..data.len().min(1024)];
        let is_pdf = window
            .windows(PDF_MAGIC.len())
            .any(|w| w == PDF_MAGIC);

        if is_pdf {
            Ok(())
        } else {
            Err(Error::UnsupportedFileType(format!(
                "{} is not a PDF document",
                filename
            )))
        }
    }

    /// Synchronous extraction; run on the blocking pool
    pub fn extract_sync(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        Self::ensure_pdf(filename, data)?;

        // pdf-extract panics on some malformed fonts and streams
        let content = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| Error::file_parse(filename, "extractor panicked on malformed PDF"))?
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(e) => {
                tracing::debug!("Could not count pages of {}: {}", filename, e);
                None
            }
        };

        Ok(ExtractedText {
            content,
            total_pages,
        })
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let filename = filename.to_string();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || Self::extract_sync(&filename, &data))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf() {
        let result = PdfTextExtractor::ensure_pdf("notes.txt", b"just some text");
        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));
    }

    #[test]
    fn test_accepts_pdf_header() {
        assert!(PdfTextExtractor::ensure_pdf("a.pdf", b"%PDF-1.4\n...").is_ok());
        assert!(PdfTextExtractor::ensure_pdf("b.pdf", b"\xef\xbb\xbf%PDF-1.7\n").is_ok());
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let result = PdfTextExtractor::extract_sync("broken.pdf", b"%PDF-1.4\nnot really a pdf");
        assert!(matches!(result, Err(Error::FileParse { .. })));
    }
}
