//! Per-document processing state.

use std::collections::BTreeMap;

use crate::layout::DocumentStatistics;

/// Comment texts keyed by footnote number, in insertion order.
///
/// Keys start at 1 and are never reused within a document.
#[derive(Debug, Clone, Default)]
pub struct FootnoteTable {
    entries: BTreeMap<u32, String>,
    next: u32,
}

impl FootnoteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a comment and return its key.
    pub fn push(&mut self, text: impl Into<String>) -> u32 {
        self.next += 1;
        self.entries.insert(self.next, text.into());
        self.next
    }

    /// Number of recorded footnotes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no footnote has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, text)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// State that lives for exactly one document and carries across its pages.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Statistics from the first pass
    pub stats: DocumentStatistics,
    /// Footnotes produced by commented highlights
    pub footnotes: FootnoteTable,
    /// Set once a "Bibliography"/"References" block is seen
    pub in_bibliography: bool,
    /// Page currently being processed (1-indexed)
    pub page: u32,
}

impl DocumentState {
    /// Create state for a document whose statistics are known.
    pub fn new(stats: DocumentStatistics) -> Self {
        Self {
            stats,
            footnotes: FootnoteTable::new(),
            in_bibliography: false,
            page: 0,
        }
    }
}
