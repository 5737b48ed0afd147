//! First-pass document statistics.
//!
//! Every glyph run of a document is observed once, in page order, before
//! any segmentation decision is made. The result is immutable for the rest
//! of the document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::params::{
    DEFAULT_GLYPH_HEIGHT, DEFAULT_SPACING_RATIO, HEIGHT_BUCKETS_PER_UNIT, LINE_GAP_FILTER,
    MAX_LINE_HEIGHT, MEAN_HEIGHT_BIAS, MIN_LINE_HEIGHT,
};
use crate::parser::GlyphRun;

/// Numeric signals the segmenter compares runs against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Upper (less negative) edge of the next-line band
    pub line_spacing_min: f32,
    /// Lower (more negative) edge of the next-line band
    pub line_spacing_max: f32,
    /// Left margin on odd pages
    pub left_margin_odd: f32,
    /// Left margin on even pages
    pub left_margin_even: f32,
    /// Upward-biased mean glyph height
    pub mean_glyph_height: f32,
    /// Text-length weighted modal glyph height
    pub modal_glyph_height: f32,
}

impl DocumentStatistics {
    /// Left margin for a page number (1-indexed).
    pub fn left_margin(&self, page: u32) -> f32 {
        if page % 2 == 1 {
            self.left_margin_odd
        } else {
            self.left_margin_even
        }
    }

    /// Midpoint of the next-line band.
    pub fn line_spacing_mid(&self) -> f32 {
        (self.line_spacing_min + self.line_spacing_max) / 2.0
    }
}

impl Default for DocumentStatistics {
    fn default() -> Self {
        Self {
            line_spacing_min: DEFAULT_SPACING_RATIO * MIN_LINE_HEIGHT,
            line_spacing_max: DEFAULT_SPACING_RATIO * MAX_LINE_HEIGHT,
            left_margin_odd: 0.0,
            left_margin_even: 0.0,
            mean_glyph_height: DEFAULT_GLYPH_HEIGHT,
            modal_glyph_height: DEFAULT_GLYPH_HEIGHT,
        }
    }
}

/// Accumulates [`DocumentStatistics`] from glyph runs.
#[derive(Debug, Default)]
pub struct StatisticsEstimator {
    last: Option<LastRun>,
    gap_sum: f64,
    gap_height_sum: f64,
    gap_count: usize,
    margins_odd: HashMap<i32, u32>,
    margins_even: HashMap<i32, u32>,
    height_sum: f64,
    height_count: usize,
    heights: HashMap<i32, usize>,
}

#[derive(Debug, Clone, Copy)]
struct LastRun {
    page: u32,
    y: f32,
    height: f32,
}

impl StatisticsEstimator {
    /// Create an empty estimator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next run of page `page`.
    pub fn observe(&mut self, page: u32, run: &GlyphRun) {
        let height = run.magnitude();
        let chars = run.text.trim().chars().count();
        if chars == 0 || height == 0.0 {
            return;
        }

        let starts_line = match self.last {
            Some(last) if last.page == page => {
                let gap = (run.y - last.y).abs();
                if gap > 0.0 && gap < LINE_GAP_FILTER * last.height {
                    self.gap_sum += gap as f64;
                    self.gap_height_sum += last.height as f64;
                    self.gap_count += 1;
                }
                gap > f32::EPSILON
            }
            _ => true,
        };

        if starts_line {
            let margins = if page % 2 == 1 {
                &mut self.margins_odd
            } else {
                &mut self.margins_even
            };
            *margins.entry(run.x.round() as i32).or_insert(0) += 1;
        }

        self.height_sum += height as f64;
        self.height_count += 1;
        *self
            .heights
            .entry((height * HEIGHT_BUCKETS_PER_UNIT).round() as i32)
            .or_insert(0) += chars;

        self.last = Some(LastRun {
            page,
            y: run.y,
            height,
        });
    }

    /// Finish the pass.
    pub fn finish(self) -> DocumentStatistics {
        let ratio = if self.gap_count > 0 && self.gap_height_sum > 0.0 {
            (self.gap_sum / self.gap_height_sum) as f32
        } else {
            DEFAULT_SPACING_RATIO
        };

        let odd = histogram_mode(&self.margins_odd);
        let even = histogram_mode(&self.margins_even);

        let mean = if self.height_count > 0 {
            (self.height_sum / (MEAN_HEIGHT_BIAS as f64 * self.height_count as f64)) as f32
        } else {
            DEFAULT_GLYPH_HEIGHT
        };
        let modal = histogram_mode(&self.heights)
            .map(|bucket| bucket as f32 / HEIGHT_BUCKETS_PER_UNIT)
            .unwrap_or(DEFAULT_GLYPH_HEIGHT);

        let stats = DocumentStatistics {
            line_spacing_min: ratio * MIN_LINE_HEIGHT,
            line_spacing_max: ratio * MAX_LINE_HEIGHT,
            left_margin_odd: odd.or(even).unwrap_or(0) as f32,
            left_margin_even: even.or(odd).unwrap_or(0) as f32,
            mean_glyph_height: mean,
            modal_glyph_height: modal,
        };
        log::debug!(
            "statistics from {} runs ({} line gaps): {:?}",
            self.height_count,
            self.gap_count,
            stats
        );
        stats
    }
}

/// Heaviest bucket; ties go to the smaller key.
fn histogram_mode<W: Copy + Ord>(histogram: &HashMap<i32, W>) -> Option<i32> {
    histogram
        .iter()
        .max_by(|(ka, wa), (kb, wb)| wa.cmp(wb).then(kb.cmp(ka)))
        .map(|(k, _)| *k)
}
