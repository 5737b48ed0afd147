//! Document model types.
//!
//! Blocks are what segmentation produces and rendering consumes; the
//! document state carries statistics, footnotes and the bibliography flag
//! across the pages of one document.

mod document;
mod page;
mod resource;

pub use document::{DocumentState, FootnoteTable};
pub use page::{Block, BlockContent, TextKind};
pub use resource::{ColorKind, RasterImage};
