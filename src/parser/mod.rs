//! Page decoding module.

mod backend;
mod interpreter;
mod memory;
mod ops;
mod options;

pub use backend::{
    decode_text_simple, AnnotationRecord, FontInfo, LopdfBackend, PageContent, PageSource, Quad,
    ResourceLookup, TextItem,
};
pub use interpreter::{interpret, GlyphRun, ImagePlacement, PageEvent};
pub use memory::{MemoryPage, MemorySource};
pub use ops::{Matrix, MoveText, Operator, PaintImage, SetFont, ShowText};
pub use options::{ErrorMode, PageSelection, ParseOptions};
