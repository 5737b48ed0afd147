//! Rendering module: text cleanup, Markdown, images and output sinks.

mod cleanup;
pub mod image;
mod markdown;
mod result;
mod sink;

pub use self::cleanup::{is_spaceless_script_char, TextNormalizer};
pub use self::image::{encode_png, image_file_name};
pub use self::markdown::{escape_path, escape_text, render_footnotes, MarkdownRenderer, BLOCK_SEPARATOR};
pub use self::result::{ExtractionStats, RenderResult};
pub use self::sink::{ensure_dir, FileSink, MemorySink, OutputSink, IMAGES_DIR};
