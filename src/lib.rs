//! # pdfnote
//!
//! Turns annotated PDFs into Markdown notes.
//!
//! Each page's content stream is replayed to position text runs, the
//! document is scanned once for layout statistics, and runs are then
//! grouped into lines and blocks with headings, emphasis, block quotes,
//! sub/superscripts, highlights and comment footnotes reconstructed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfnote::{convert_file, ParseOptions};
//!
//! fn main() -> pdfnote::Result<()> {
//!     let markdown = convert_file("paper.pdf", ParseOptions::default())?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two-pass layout**: line spacing, margins and glyph heights are
//!   measured over the whole document before any page is segmented
//! - **Annotations**: highlights become `==marks==`, comments become footnotes
//! - **Two-column pages**: blocks are reordered into reading order
//! - **Images**: painted images are written as PNG and linked
//! - **Batch conversion**: folders, size caps, chunked output, rayon

pub mod convert;
pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    BatchConverter, BatchOptions, BatchReport, CancellationToken, DocumentOutcome,
    DocumentProcessor, DocumentStatus, OverwritePolicy,
};
pub use detect::{is_pdf, sniff_bytes, sniff_file, PdfHeader};
pub use error::{Error, Result};
pub use layout::DocumentStatistics;
pub use model::{Block, BlockContent, TextKind};
pub use parser::{ErrorMode, LopdfBackend, MemoryPage, MemorySource, PageSelection, PageSource, ParseOptions};
pub use render::{ExtractionStats, FileSink, MemorySink, OutputSink, RenderResult};

use std::path::Path;

/// Convert a PDF file to Markdown.
///
/// Images are kept in memory and dropped; use a [`FileSink`] with
/// [`DocumentProcessor::process`] to write them out.
///
/// # Example
///
/// ```no_run
/// use pdfnote::{convert_file, ParseOptions};
///
/// let markdown = convert_file("paper.pdf", ParseOptions::new().text_only()).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<String> {
    Ok(convert_file_with_stats(path, options)?.content)
}

/// Convert a PDF file to Markdown with statistics.
pub fn convert_file_with_stats<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<RenderResult> {
    let path = path.as_ref();
    let backend = open(LopdfBackend::load_file(path)?)?;
    DocumentProcessor::new(options)?.render(&backend, &document_name(path))
}

/// Convert PDF bytes to Markdown.
///
/// # Example
///
/// ```no_run
/// use pdfnote::{convert_bytes, ParseOptions};
///
/// let data = std::fs::read("paper.pdf").unwrap();
/// let markdown = convert_bytes(&data, ParseOptions::default()).unwrap();
/// ```
pub fn convert_bytes(data: &[u8], options: ParseOptions) -> Result<String> {
    let backend = open(LopdfBackend::load_bytes(data)?)?;
    Ok(DocumentProcessor::new(options)?.render(&backend, "document")?.content)
}

/// Run only the statistics pass over a PDF file.
///
/// # Example
///
/// ```no_run
/// let stats = pdfnote::statistics_for_file("paper.pdf").unwrap();
/// println!("body text height: {}", stats.modal_glyph_height);
/// ```
pub fn statistics_for_file<P: AsRef<Path>>(path: P) -> Result<DocumentStatistics> {
    let path = path.as_ref();
    let backend = open(LopdfBackend::load_file(path)?)?;
    DocumentProcessor::new(ParseOptions::default())?.statistics(&backend, &document_name(path))
}

fn open(backend: LopdfBackend) -> Result<LopdfBackend> {
    if backend.is_encrypted() {
        return Err(Error::Encrypted);
    }
    Ok(backend)
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
