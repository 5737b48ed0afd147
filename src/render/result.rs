//! Conversion result with statistics.

use serde::{Deserialize, Serialize};

use crate::layout::DocumentStatistics;

/// Result of converting one document in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered Markdown
    pub content: String,

    /// Layout statistics from the first pass
    pub layout: DocumentStatistics,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, layout: DocumentStatistics, stats: ExtractionStats) -> Self {
        Self {
            content,
            layout,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while converting a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of pages rendered
    pub page_count: u32,

    /// Pages skipped in lenient mode
    pub pages_skipped: u32,

    /// Number of paragraphs rendered
    pub paragraph_count: u32,

    /// Number of headings rendered
    pub heading_count: u32,

    /// Number of block quotations rendered
    pub quote_count: u32,

    /// Number of images written
    pub image_count: u32,

    /// Images that failed to decode or encode
    pub images_skipped: u32,

    /// Highlights matched in the first pass
    pub highlight_count: u32,

    /// Footnotes produced by commented highlights
    pub footnote_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Increment skipped page count.
    pub fn skip_page(&mut self) {
        self.pages_skipped += 1;
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    /// Increment heading count.
    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    /// Increment quote count.
    pub fn add_quote(&mut self) {
        self.quote_count += 1;
    }

    /// Increment image count.
    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Increment skipped image count.
    pub fn skip_image(&mut self) {
        self.images_skipped += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        // Word count: whitespace-separated tokens
        self.word_count += text.split_whitespace().count() as u32;

        // Character count: non-whitespace characters
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.pages_skipped += other.pages_skipped;
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.quote_count += other.quote_count;
        self.image_count += other.image_count;
        self.images_skipped += other.images_skipped;
        self.highlight_count += other.highlight_count;
        self.footnote_count += other.footnote_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
