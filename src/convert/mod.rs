//! Document orchestration.
//!
//! [`DocumentProcessor`] runs both passes over one document;
//! [`BatchConverter`] fans many documents out over files and folders.
//!
//! # Example
//!
//! ```no_run
//! use pdfnote::convert::{BatchConverter, BatchOptions};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> pdfnote::Result<()> {
//!     let converter = BatchConverter::new(BatchOptions::default());
//!     let report = converter.run(&[PathBuf::from("papers")], Some(Path::new("notes")))?;
//!     println!("{} converted, {} failed", report.converted(), report.failed());
//!     Ok(())
//! }
//! ```

mod batch;
mod document;

pub use batch::{
    plan_outputs, BatchConverter, BatchOptions, BatchReport, DocumentOutcome, DocumentStatus,
    OverwritePolicy,
};
pub use document::{CancellationToken, DocumentProcessor};
