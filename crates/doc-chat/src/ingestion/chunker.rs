//! Paragraph-packing text chunker

/// Splits text on line boundaries and greedily packs paragraphs into passages
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    /// Character budget per passage
    max_chars: usize,
}

impl ParagraphChunker {
    /// Create a new chunker with the given character budget
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Character budget per passage
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split text into ordered passages.
    ///
    /// A paragraph is appended while the pre-append length plus the paragraph
    /// stays under the budget, so a passage may overshoot by one paragraph.
    /// Passages that trim to nothing are not emitted.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        // Length in chars, tracked alongside `current` to avoid rescanning it.
        let mut current_len = 0usize;

        for paragraph in text.split('\n') {
            let paragraph_len = paragraph.chars().count();

            if current_len + paragraph_len < self.max_chars {
                current.push_str(paragraph);
                current.push(' ');
                current_len += paragraph_len + 1;
            } else {
                Self::flush(&mut chunks, &current);
                current = paragraph.to_string();
                current_len = paragraph_len;
            }
        }

        Self::flush(&mut chunks, &current);

        tracing::debug!(
            "Chunked {} chars into {} passages (budget {})",
            text.len(),
            chunks.len(),
            self.max_chars
        );

        chunks
    }

    fn flush(chunks: &mut Vec<String>, current: &str) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(500)
    }
}
