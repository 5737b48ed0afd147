//! Output destinations for rendered Markdown and extracted images.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::image::encode_png;

/// Directory, relative to the Markdown file, that receives images.
pub const IMAGES_DIR: &str = "images";

/// Where a document's Markdown and images go.
pub trait OutputSink {
    /// Append rendered text. Each call carries whole blocks.
    fn append(&mut self, text: &str) -> Result<()>;

    /// Store an RGBA image and return the path to reference it by.
    fn write_image(&mut self, name: &str, rgba: &[u8], width: u32, height: u32) -> Result<String>;

    /// Flush buffered output.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Create a directory tree, treating an existing directory as success.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Sink writing Markdown files and PNG images to disk.
///
/// With a chunk size set, output rolls over to `name-2.md`, `name-3.md`
/// and so on once the current file would grow past it. Rolling only happens
/// between appends, so blocks are never split.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    chunk_size: usize,
    images_dir: PathBuf,
    writer: Option<BufWriter<File>>,
    current_len: usize,
    outputs: Vec<PathBuf>,
}

impl FileSink {
    /// Create a sink writing to `path`, with images next to it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let images_dir = path
            .parent()
            .map(|p| p.join(IMAGES_DIR))
            .unwrap_or_else(|| PathBuf::from(IMAGES_DIR));
        Self {
            path,
            chunk_size: 0,
            images_dir,
            writer: None,
            current_len: 0,
            outputs: Vec::new(),
        }
    }

    /// Roll to a new file once a chunk would exceed `bytes` (0 disables).
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Markdown files written so far, in order.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        if index == 1 {
            return self.path.clone();
        }
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match self.path.extension() {
            Some(ext) => format!("{}-{}.{}", stem, index, ext.to_string_lossy()),
            None => format!("{}-{}", stem, index),
        };
        self.path.with_file_name(name)
    }

    fn open_next(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        let path = self.chunk_path(self.outputs.len() + 1);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        log::debug!("opening output {}", path.display());
        self.writer = Some(BufWriter::new(File::create(&path)?));
        self.outputs.push(path);
        self.current_len = 0;
        Ok(())
    }
}

impl OutputSink for FileSink {
    fn append(&mut self, text: &str) -> Result<()> {
        let roll = self.chunk_size > 0
            && self.current_len > 0
            && self.current_len + text.len() > self.chunk_size;
        if self.writer.is_none() || roll {
            self.open_next()?;
        }
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Render("output file not open".to_string()))?;
        writer.write_all(text.as_bytes())?;
        self.current_len += text.len();
        Ok(())
    }

    fn write_image(&mut self, name: &str, rgba: &[u8], width: u32, height: u32) -> Result<String> {
        let png = encode_png(rgba, width, height)?;
        ensure_dir(&self.images_dir)?;
        fs::write(self.images_dir.join(name), png)?;
        Ok(format!("{}/{}", IMAGES_DIR, name))
    }

    fn finish(&mut self) -> Result<()> {
        if self.outputs.is_empty() {
            self.open_next()?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Sink keeping everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    markdown: String,
    images: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Markdown appended so far.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Encoded PNG images with their reference paths.
    pub fn images(&self) -> &[(String, Vec<u8>)] {
        &self.images
    }

    /// Consume the sink and return its Markdown.
    pub fn into_markdown(self) -> String {
        self.markdown
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, text: &str) -> Result<()> {
        self.markdown.push_str(text);
        Ok(())
    }

    fn write_image(&mut self, name: &str, rgba: &[u8], width: u32, height: u32) -> Result<String> {
        let png = encode_png(rgba, width, height)?;
        let path = format!("{}/{}", IMAGES_DIR, name);
        self.images.push((path.clone(), png));
        Ok(path)
    }
}
