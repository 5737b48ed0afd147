//! Two-pass conversion of one document.
//!
//! The first pass replays every page to gather layout statistics and match
//! highlights to runs. The second pass replays the selected pages again,
//! segments them into blocks with the finished statistics, reorders the
//! blocks and streams them to the sink.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::layout::{
    reorder_blocks, AnnotationMatcher, DocumentStatistics, PageMarkers, PageSegmenter,
    StatisticsEstimator,
};
use crate::model::DocumentState;
use crate::parser::{interpret, ErrorMode, ImagePlacement, PageContent, PageEvent, PageSource, ParseOptions};
use crate::render::{
    image_file_name, render_footnotes, ExtractionStats, MarkdownRenderer, MemorySink, OutputSink,
    RenderResult, TextNormalizer,
};

/// Cooperative cancellation flag shared between threads.
///
/// Checked at every page boundary of both passes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Output of the first pass.
struct FirstPass {
    stats: DocumentStatistics,
    markers: HashMap<u32, PageMarkers>,
    highlight_count: u32,
    failed_pages: HashSet<u32>,
}

/// Converts documents to Markdown.
///
/// A processor holds no per-document state and can be shared by the
/// threads of a batch.
#[derive(Debug)]
pub struct DocumentProcessor {
    options: ParseOptions,
    normalizer: TextNormalizer,
    cancel: Option<CancellationToken>,
}

impl DocumentProcessor {
    /// Create a processor with the given options.
    pub fn new(options: ParseOptions) -> Result<Self> {
        Ok(Self {
            options,
            normalizer: TextNormalizer::new()?,
            cancel: None,
        })
    }

    /// Observe a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run only the first pass and return the layout statistics.
    pub fn statistics(&self, source: &dyn PageSource, name: &str) -> Result<DocumentStatistics> {
        Ok(self.first_pass(source, name)?.stats)
    }

    /// Convert a document, streaming Markdown and images to `sink`.
    ///
    /// `name` identifies the document in log lines and image file names.
    pub fn process(
        &self,
        source: &dyn PageSource,
        sink: &mut dyn OutputSink,
        name: &str,
    ) -> Result<ExtractionStats> {
        let (_, stats) = self.run(source, sink, name)?;
        Ok(stats)
    }

    /// Convert a document in memory.
    pub fn render(&self, source: &dyn PageSource, name: &str) -> Result<RenderResult> {
        let mut sink = MemorySink::new();
        let (layout, stats) = self.run(source, &mut sink, name)?;
        Ok(RenderResult::new(sink.into_markdown(), layout, stats))
    }

    fn run(
        &self,
        source: &dyn PageSource,
        sink: &mut dyn OutputSink,
        name: &str,
    ) -> Result<(DocumentStatistics, ExtractionStats)> {
        let first = self.first_pass(source, name)?;
        let layout = first.stats;
        let mut state = DocumentState::new(first.stats);
        let mut renderer = MarkdownRenderer::new();
        let mut counts = ExtractionStats::new();

        for number in 1..=source.page_count() {
            self.check_cancelled()?;
            if !self.options.pages.includes(number) {
                continue;
            }
            if first.failed_pages.contains(&number) {
                counts.skip_page();
                continue;
            }
            let Some(page) = self.load_page(source, number, name)? else {
                counts.skip_page();
                continue;
            };

            let events = interpret(&page, &self.normalizer);
            let markers = first.markers.get(&number);
            let mut segmenter = PageSegmenter::new(&mut state, number);
            let mut image_index = 0;

            for event in &events {
                match event {
                    PageEvent::Run(run) => {
                        let run_markers = markers
                            .and_then(|m| m.get(&run.item))
                            .map(Vec::as_slice)
                            .unwrap_or(&[]);
                        segmenter.push_run(run, run_markers);
                    }
                    PageEvent::Image(placement) if self.options.extract_images => {
                        match self.extract_image(&page, placement, sink, name, image_index) {
                            Ok(path) => segmenter.push_image(placement, path),
                            Err(e) => {
                                log::warn!(
                                    "{}: page {}: skipping image {}: {}",
                                    name,
                                    number,
                                    placement.resource,
                                    e
                                );
                                counts.skip_image();
                            }
                        }
                        image_index += 1;
                    }
                    PageEvent::Image(_) => {}
                }
            }

            let blocks = reorder_blocks(segmenter.finish(), page.width, page.height);
            log::debug!("{}: page {}: {} blocks", name, number, blocks.len());
            for block in &blocks {
                sink.append(&renderer.render_block(block))?;
            }
            counts.add_page();
        }

        if !state.footnotes.is_empty() {
            sink.append(&render_footnotes(&state.footnotes))?;
        }
        sink.finish()?;

        let mut stats = renderer.into_stats();
        stats.merge(&counts);
        stats.highlight_count = first.highlight_count;
        stats.footnote_count = state.footnotes.len() as u32;

        log::info!(
            "{}: {} pages, {} headings, {} paragraphs, {} images, {} footnotes",
            name,
            stats.page_count,
            stats.heading_count,
            stats.paragraph_count,
            stats.image_count,
            stats.footnote_count
        );
        Ok((layout, stats))
    }

    fn first_pass(&self, source: &dyn PageSource, name: &str) -> Result<FirstPass> {
        let mut estimator = StatisticsEstimator::new();
        let mut markers = HashMap::new();
        let mut highlight_count = 0;
        let mut failed_pages = HashSet::new();

        for number in 1..=source.page_count() {
            self.check_cancelled()?;
            let Some(page) = self.load_page(source, number, name)? else {
                failed_pages.insert(number);
                continue;
            };

            let mut matcher = self
                .options
                .extract_annotations
                .then(|| AnnotationMatcher::new(number, &page.annotations));

            for event in interpret(&page, &self.normalizer) {
                if let PageEvent::Run(run) = event {
                    estimator.observe(number, &run);
                    if let Some(matcher) = matcher.as_mut() {
                        matcher.observe(&run);
                    }
                }
            }

            if let Some(matcher) = matcher {
                highlight_count += matcher.highlight_count() as u32;
                markers.insert(number, matcher.finish());
            }
        }

        let stats = estimator.finish();
        log::debug!("{}: layout statistics {:?}", name, stats);
        Ok(FirstPass {
            stats,
            markers,
            highlight_count,
            failed_pages,
        })
    }

    /// Load a page, skipping it in lenient mode when it fails to decode.
    fn load_page<'s>(
        &self,
        source: &'s dyn PageSource,
        number: u32,
        name: &str,
    ) -> Result<Option<PageContent<'s>>> {
        match source.page(number) {
            Ok(page) => Ok(Some(page)),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("{}: skipping page {}: {}", name, number, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn extract_image(
        &self,
        page: &PageContent<'_>,
        placement: &ImagePlacement,
        sink: &mut dyn OutputSink,
        name: &str,
        index: usize,
    ) -> Result<String> {
        let image = page.resources.image(&placement.resource)?;
        let rgba = image.to_rgba()?;
        let file_name = image_file_name(name, page.number, &placement.resource, index);
        log::debug!(
            "{}: page {}: writing {} image {}x{} as {}",
            name,
            page.number,
            image.kind.as_str(),
            image.width,
            image.height,
            file_name
        );
        sink.write_image(&file_name, &rgba, image.width, image.height)
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}
