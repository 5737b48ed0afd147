//! Fixed thresholds of the layout heuristics.
//!
//! Heights and distances are in page units unless noted; factors are
//! multiplied by the glyph-run height ("magnitude") they are compared to.

/// Lower edge of the next-line band, scaled by the spacing ratio.
pub const MIN_LINE_HEIGHT: f32 = -0.7;
/// Upper edge of the next-line band, scaled by the spacing ratio.
pub const MAX_LINE_HEIGHT: f32 = -1.3;
/// Spacing ratio used when a document yields no line gaps.
pub const DEFAULT_SPACING_RATIO: f32 = 1.2;
/// Gaps at or above this many previous-run heights are paragraph or column breaks.
pub const LINE_GAP_FILTER: f32 = 5.0;

/// Divisor applied to the height count when computing the mean glyph height.
pub const MEAN_HEIGHT_BIAS: f32 = 0.8;
/// Mean and modal height when a document has no text at all.
pub const DEFAULT_GLYPH_HEIGHT: f32 = 12.0;
/// Histogram buckets per unit of height.
pub const HEIGHT_BUCKETS_PER_UNIT: f32 = 10.0;

/// Line-start tolerance around margins.
pub const MARGIN_DEVIANCE: f32 = 1.0;
/// Line-start tolerance once inside a bibliography.
pub const BIBLIOGRAPHY_MARGIN_DEVIANCE: f32 = 3.0;
/// Runs below this fraction of the modal height never start a new line.
pub const NEW_LINE_DEVIANCE: f32 = 0.6;
/// Largest |y change| still considered the same line.
pub const SAME_LINE_DEVIANCE: f32 = 0.5;
/// Backwards x movement tolerated on the same line.
pub const X_BACKTRACK: f32 = 2.0;

/// Block quotes are set below this fraction of the modal height.
pub const BLOCKQUOTE_DEVIANCE: f32 = 0.95;
/// Nearest the margin may sit to a quote start, in run heights.
pub const BLOCKQUOTE_MIN_INDENT: f32 = 1.25;
/// Farthest the margin may sit from a quote start, in run heights.
pub const BLOCKQUOTE_MAX_INDENT: f32 = 4.0;

/// Sub/superscripts are set below this fraction of the modal height.
pub const SUBSCRIPT_DEVIANCE: f32 = 0.75;

/// Numerator of the heading level formula.
pub const HEADING_SCALE: f32 = 0.5;
/// All-caps blocks above this fraction of the mean height become level-3 headings.
pub const ALL_CAPS_HEADING_RATIO: f32 = 0.9;
/// Level forced on all-caps headings.
pub const ALL_CAPS_HEADING_LEVEL: u8 = 3;
/// Deepest heading level Markdown supports.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Vertical jitter tolerated when matching annotation quads.
pub const ANNOTATION_FUDGE: f32 = 2.0;

/// Estimated glyph advance as a fraction of the font size.
pub const GLYPH_WIDTH_FACTOR: f32 = 0.5;
/// Same-line gaps wider than this fraction of a glyph get a space.
pub const SPACE_GAP_FACTOR: f32 = 0.2;

/// Blocks starting right of this fraction of the page width may be a second column.
pub const COLUMN_THRESHOLD: f32 = 0.4;
/// Blocks below this fraction of the page height are footers.
pub const FOOTER_THRESHOLD: f32 = 0.08;
/// Blocks above this fraction of the page height are headers.
pub const HEADER_THRESHOLD: f32 = 0.92;
