//! Layout reconstruction.
//!
//! The transform stack positions runs, the statistics estimator and the
//! annotation matcher run over a whole document first, and the segmenter
//! and reorderer then turn each page into blocks.

mod annotations;
pub mod params;
mod reorder;
mod segment;
mod statistics;
mod transform;

pub use annotations::{AnnotationMatcher, HighlightMarker, PageMarkers};
pub use reorder::reorder_blocks;
pub use segment::{
    heading_level, insert_highlight_markers, LineDecision, PageCursor, PageSegmenter, SegmentState,
};
pub use statistics::{DocumentStatistics, StatisticsEstimator};
pub use transform::{TransformError, TransformState};
