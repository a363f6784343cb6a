//! Document ingestion: PDF text extraction and passage chunking

mod chunker;
mod parser;

pub use chunker::ParagraphChunker;
pub use parser::{ExtractedText, PdfTextExtractor, TextExtractor};
