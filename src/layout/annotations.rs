//! Reconciles highlight annotations with glyph runs.
//!
//! Runs are matched in the first pass. The first run inside a highlight's
//! first quad opens it; the last run inside its last quad closes it and
//! carries the comment thread, if any.

use std::collections::HashMap;

use super::params::ANNOTATION_FUDGE;
use crate::parser::{AnnotationRecord, GlyphRun, Quad};

/// Highlight signal attached to one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlightMarker {
    /// A highlight opens inside this run
    pub start: bool,
    /// A highlight closes inside this run
    pub end: bool,
    /// Where the highlight opens, as a fraction of the run width
    pub left_fraction: f32,
    /// Where the highlight closes, as a fraction of the run width
    pub right_fraction: f32,
    /// The closing highlight has comment text
    pub is_comment: bool,
    /// Footnote body for a commented highlight
    pub comment_text: Option<String>,
}

/// Markers of one page, keyed by text item index.
///
/// A run can carry several markers when more than one highlight opens or
/// closes inside it. Each list is ordered left to right.
pub type PageMarkers = HashMap<usize, Vec<HighlightMarker>>;

#[derive(Debug)]
struct HighlightThread {
    quads: Vec<Quad>,
    comment: Option<String>,
    first: Option<(usize, f32)>,
    last: Option<(usize, f32)>,
}

/// Per-page matcher between highlight quads and runs.
#[derive(Debug)]
pub struct AnnotationMatcher {
    threads: Vec<HighlightThread>,
}

impl AnnotationMatcher {
    /// Build highlight threads for page `page` from its annotations.
    pub fn new(page: u32, annotations: &[AnnotationRecord]) -> Self {
        let mut threads = Vec::new();
        for (index, annotation) in annotations.iter().enumerate() {
            if annotation.quads.is_empty() {
                if annotation.in_reply_to.is_none() {
                    log::debug!("page {}: annotation {} has no quads", page, index);
                }
                continue;
            }

            let mut bodies: Vec<&str> = annotation.contents.iter().map(|s| s.as_str()).collect();
            if let Some(id) = &annotation.id {
                bodies.extend(
                    annotations
                        .iter()
                        .filter(|reply| reply.in_reply_to.as_deref() == Some(id.as_str()))
                        .filter_map(|reply| reply.contents.as_deref()),
                );
            }
            let bodies: Vec<&str> = bodies
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            let comment = if bodies.is_empty() {
                None
            } else {
                Some(format!("p. {}: {}", page, bodies.join("\n")))
            };

            threads.push(HighlightThread {
                quads: annotation.quads.clone(),
                comment,
                first: None,
                last: None,
            });
        }
        Self { threads }
    }

    /// Number of highlights on the page.
    pub fn highlight_count(&self) -> usize {
        self.threads.len()
    }

    /// Test a run against every highlight.
    pub fn observe(&mut self, run: &GlyphRun) {
        for thread in &mut self.threads {
            let (Some(first), Some(last)) = (thread.quads.first(), thread.quads.last()) else {
                continue;
            };
            if thread.first.is_none() && contains(first, run) {
                thread.first = Some((run.item, left_fraction(first, run)));
            }
            if contains(last, run) {
                thread.last = Some((run.item, right_fraction(last, run)));
            }
        }
    }

    /// Collapse the matches into per-run markers.
    pub fn finish(self) -> PageMarkers {
        let mut markers = PageMarkers::new();
        for thread in self.threads {
            let same_run = match (thread.first, thread.last) {
                (Some((first, _)), Some((last, _))) => first == last,
                _ => false,
            };
            if let Some((item, fraction)) = thread.first {
                if !same_run {
                    markers.entry(item).or_default().push(HighlightMarker {
                        start: true,
                        left_fraction: fraction,
                        ..Default::default()
                    });
                }
            }
            if let Some((item, fraction)) = thread.last {
                let mut close = HighlightMarker {
                    end: true,
                    right_fraction: fraction,
                    ..Default::default()
                };
                if same_run {
                    if let Some((_, left)) = thread.first {
                        close.start = true;
                        close.left_fraction = left;
                    }
                }
                if let Some(comment) = thread.comment {
                    close.is_comment = true;
                    close.comment_text = Some(comment);
                }
                markers.entry(item).or_default().push(close);
            }
        }
        for list in markers.values_mut() {
            list.sort_by(|a, b| a.position().total_cmp(&b.position()));
        }
        markers
    }
}

impl HighlightMarker {
    /// Sort key within a run: the closing position, or the opening one.
    fn position(&self) -> f32 {
        if self.end {
            self.right_fraction
        } else {
            self.left_fraction
        }
    }
}

/// Vertical containment with jitter tolerance, plus horizontal overlap.
fn contains(quad: &Quad, run: &GlyphRun) -> bool {
    let vertical = run.top() - ANNOTATION_FUDGE < quad.top && quad.bottom < run.y;
    let horizontal = quad.left < run.right() && quad.right > run.x;
    vertical && horizontal
}

fn left_fraction(quad: &Quad, run: &GlyphRun) -> f32 {
    fraction(quad.left, run)
}

fn right_fraction(quad: &Quad, run: &GlyphRun) -> f32 {
    fraction(quad.right, run)
}

fn fraction(x: f32, run: &GlyphRun) -> f32 {
    if run.width <= 0.0 {
        return 0.0;
    }
    ((x - run.x) / run.width).clamp(0.0, 1.0)
}
