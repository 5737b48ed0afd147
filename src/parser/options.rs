//! Processing options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for converting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to extract painted images
    pub extract_images: bool,

    /// Whether to turn highlights and comments into markers and footnotes
    pub extract_annotations: bool,

    /// Page selection (which pages to render)
    pub pages: PageSelection,
}

impl ParseOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to decode).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable annotation extraction.
    pub fn with_annotations(mut self, extract: bool) -> Self {
        self.extract_annotations = extract;
        self
    }

    /// Extract text only.
    pub fn text_only(mut self) -> Self {
        self.extract_images = false;
        self.extract_annotations = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_images: true,
            extract_annotations: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// A page that fails to decode fails the document
    #[default]
    Strict,
    /// Skip pages that fail to decode and continue
    Lenient,
}

/// Page selection for rendering.
///
/// Statistics are always gathered over every page so that selecting a
/// range does not change how the selected pages are segmented.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// Single page (1-indexed)
    Single(u32),
    /// Range of pages (inclusive, 1-indexed)
    Range(u32, u32),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number (1-indexed) is included in the selection.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Single(p) => *p == page,
            PageSelection::Range(start, end) => page >= *start && page <= *end,
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection such as `"3"`, `"2-5"` or `"1,3,5-7"`.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(spec.to_string());
        let parse_page = |s: &str| -> Result<u32> {
            match s.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };

        let mut pages = Vec::new();
        for part in spec.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start)?;
                    let end = parse_page(end)?;
                    if start > end {
                        return Err(invalid());
                    }
                    if !spec.contains(',') {
                        return Ok(PageSelection::Range(start, end));
                    }
                    pages.extend(start..=end);
                }
                None => pages.push(parse_page(part)?),
            }
        }

        if pages.len() == 1 {
            return Ok(PageSelection::Single(pages[0]));
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}
