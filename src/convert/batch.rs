//! Batch conversion of files and folders.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detect::{has_pdf_extension, is_pdf};
use crate::error::{Error, Result};
use crate::parser::{ErrorMode, LopdfBackend, PageSelection, ParseOptions};
use crate::render::{ExtractionStats, FileSink};

use super::{CancellationToken, DocumentProcessor};

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace existing output
    #[default]
    Overwrite,
    /// Leave existing output alone and skip the document
    Skip,
}

/// Batch configuration, loadable from JSON. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Skip files larger than this many megabytes (0 = no limit)
    pub max_file_size_mb: u64,

    /// Convert at most this many files (0 = no limit)
    pub max_files: usize,

    /// Existing output handling
    pub overwrite: OverwritePolicy,

    /// Roll output to a new file past this many bytes (0 = single file)
    pub chunk_size_bytes: usize,

    /// Write painted images next to the Markdown
    pub extract_images: bool,

    /// Turn highlights and comments into markers and footnotes
    pub extract_annotations: bool,

    /// Convert documents on the rayon thread pool
    pub parallel: bool,

    /// Page failure handling
    pub error_mode: ErrorMode,

    /// Pages to render
    pub pages: PageSelection,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_file_size_mb: 200,
            max_files: 0,
            overwrite: OverwritePolicy::Overwrite,
            chunk_size_bytes: 0,
            extract_images: true,
            extract_annotations: true,
            parallel: false,
            error_mode: ErrorMode::Strict,
            pages: PageSelection::All,
        }
    }
}

impl BatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Per-document options derived from the batch options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_error_mode(self.error_mode)
            .with_images(self.extract_images)
            .with_annotations(self.extract_annotations)
            .with_pages(self.pages.clone())
    }
}

/// Final state of one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Markdown was written
    Converted,
    /// Skipped by the overwrite policy or size cap
    Skipped(String),
    /// Conversion failed
    Failed(String),
    /// Cancellation was requested before or during conversion
    Cancelled,
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Input PDF
    pub input: PathBuf,
    /// Markdown files written, in order
    pub outputs: Vec<PathBuf>,
    /// Final state
    #[serde(flatten)]
    pub status: DocumentStatus,
    /// Statistics of a converted document
    pub stats: Option<ExtractionStats>,
}

impl DocumentOutcome {
    fn new(input: &Path, status: DocumentStatus) -> Self {
        Self {
            input: input.to_path_buf(),
            outputs: Vec::new(),
            status,
            stats: None,
        }
    }
}

/// Outcomes of a whole batch, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per input document
    pub documents: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Number of converted documents.
    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Converted))
    }

    /// Number of skipped documents.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Skipped(_)))
    }

    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Failed(_)))
    }

    /// Number of cancelled documents.
    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Cancelled))
    }

    /// Statistics summed over converted documents.
    pub fn total_stats(&self) -> ExtractionStats {
        let mut total = ExtractionStats::new();
        for stats in self.documents.iter().filter_map(|d| d.stats.as_ref()) {
            total.merge(stats);
        }
        total
    }

    fn count(&self, pred: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.status)).count()
    }
}

/// Converts many documents with shared options.
#[derive(Debug)]
pub struct BatchConverter {
    options: BatchOptions,
    cancel: CancellationToken,
}

impl BatchConverter {
    /// Create a converter.
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels this converter's batches.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Expand inputs into the list of PDFs to convert.
    ///
    /// Folders are scanned recursively for files with a PDF header; files
    /// named explicitly are always kept. The list is capped at `max_files`.
    pub fn collect_inputs(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            if input.is_dir() {
                scan_dir(input, &mut files)?;
            } else {
                files.push(input.clone());
            }
        }

        if self.options.max_files > 0 && files.len() > self.options.max_files {
            log::warn!(
                "{} inputs found, converting the first {}",
                files.len(),
                self.options.max_files
            );
            files.truncate(self.options.max_files);
        }
        Ok(files)
    }

    /// Convert every input, writing Markdown into `output_dir` or next to
    /// each input when `None`.
    pub fn run(&self, inputs: &[PathBuf], output_dir: Option<&Path>) -> Result<BatchReport> {
        self.run_with_progress(inputs, output_dir, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_done` after each document.
    pub fn run_with_progress<F>(
        &self,
        inputs: &[PathBuf],
        output_dir: Option<&Path>,
        on_done: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        let files = self.collect_inputs(inputs)?;
        let outputs = plan_outputs(&files, output_dir);
        let processor = DocumentProcessor::new(self.options.parse_options())?
            .with_cancellation(self.cancel.clone());

        let convert = |(input, output): (&PathBuf, &PathBuf)| {
            let outcome = self.convert_one(&processor, input, output);
            on_done(&outcome);
            outcome
        };

        let documents = if self.options.parallel {
            files.par_iter().zip(outputs.par_iter()).map(convert).collect()
        } else {
            files.iter().zip(outputs.iter()).map(convert).collect()
        };

        let report = BatchReport { documents };
        log::info!(
            "batch finished: {} converted, {} skipped, {} failed, {} cancelled",
            report.converted(),
            report.skipped(),
            report.failed(),
            report.cancelled()
        );
        Ok(report)
    }

    fn convert_one(&self, processor: &DocumentProcessor, input: &Path, output: &Path) -> DocumentOutcome {
        if self.cancel.is_cancelled() {
            return DocumentOutcome::new(input, DocumentStatus::Cancelled);
        }
        if self.options.overwrite == OverwritePolicy::Skip && output.exists() {
            log::info!("{}: output exists, skipping", input.display());
            return DocumentOutcome::new(input, DocumentStatus::Skipped("output exists".into()));
        }
        if let Some(reason) = self.size_violation(input) {
            log::warn!("{}: {}", input.display(), reason);
            return DocumentOutcome::new(input, DocumentStatus::Skipped(reason));
        }

        let name = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mut sink = FileSink::new(output).with_chunk_size(self.options.chunk_size_bytes);

        let result = LopdfBackend::load_file(input).and_then(|backend| {
            if backend.is_encrypted() {
                return Err(Error::Encrypted);
            }
            log::debug!("{}: PDF {}", input.display(), backend.version());
            processor.process(&backend, &mut sink, &name)
        });

        match result {
            Ok(stats) => DocumentOutcome {
                input: input.to_path_buf(),
                outputs: sink.outputs().to_vec(),
                status: DocumentStatus::Converted,
                stats: Some(stats),
            },
            Err(Error::Cancelled) => {
                log::info!("{}: cancelled", input.display());
                DocumentOutcome::new(input, DocumentStatus::Cancelled)
            }
            Err(e) => {
                log::warn!("{}: conversion failed: {}", input.display(), e);
                DocumentOutcome::new(input, DocumentStatus::Failed(e.to_string()))
            }
        }
    }

    fn size_violation(&self, input: &Path) -> Option<String> {
        let limit = self.options.max_file_size_mb;
        if limit == 0 {
            return None;
        }
        let size = fs::metadata(input).ok()?.len();
        (size > limit * 1024 * 1024).then(|| format!("file is larger than {} MB", limit))
    }
}

/// Recursively collect PDF files under `dir`, sorted by path.
fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if is_pdf(&path) {
            files.push(path);
        } else if has_pdf_extension(&path) {
            log::debug!("{}: no PDF header, ignoring", path.display());
        }
    }
    Ok(())
}

/// Assign each input a distinct Markdown path before any conversion starts.
///
/// Colliding names get a `_N` suffix. The chunk rollover names of every
/// output (`stem-N.md`) are reserved as well, so no two documents can ever
/// write the same file.
pub fn plan_outputs(inputs: &[PathBuf], output_dir: Option<&Path>) -> Vec<PathBuf> {
    let bases: Vec<(PathBuf, String)> = inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let dir = match output_dir {
                Some(dir) => dir.to_path_buf(),
                None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
            };
            (dir, stem)
        })
        .collect();
    let key = |dir: &Path, stem: &str| dir.join(stem).to_string_lossy().to_lowercase();
    let input_keys: Vec<String> = bases.iter().map(|(dir, stem)| key(dir, stem)).collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut outputs = Vec::with_capacity(bases.len());
    for (dir, stem) in &bases {
        let mut name = stem.clone();
        let mut n = 1;
        loop {
            let candidate = key(dir, &name);
            let clash = taken.contains(&candidate)
                || input_keys
                    .iter()
                    .chain(taken.iter())
                    .any(|other| is_chunk_of(&candidate, other))
                || taken.iter().any(|other| is_chunk_of(other, &candidate));
            if !clash {
                taken.insert(candidate);
                break;
            }
            n += 1;
            name = format!("{}_{}", stem, n);
        }
        outputs.push(dir.join(format!("{}.md", name)));
    }
    outputs
}

/// True when `name` is `base-N`, the name of one of `base`'s chunk files.
fn is_chunk_of(name: &str, base: &str) -> bool {
    name.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
