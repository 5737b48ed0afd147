//! Operator replay.
//!
//! Walks a page's drawing program through the transform stack and the
//! text state and yields positioned glyph runs and image paints. Both
//! passes of the document processor replay pages through here, so the
//! same run always comes out with the same geometry.

use std::collections::HashMap;

use super::backend::{FontInfo, PageContent};
use super::ops::{Matrix, Operator};
use crate::layout::params::GLYPH_WIDTH_FACTOR;
use crate::layout::TransformState;
use crate::render::TextNormalizer;

/// Leading used by `T*` when none was set, as a multiple of the font size.
const DEFAULT_LEADING_FACTOR: f32 = 1.2;

/// One positioned, styled text fragment in page space.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// Index of the text item that produced this run
    pub item: usize,
    /// Normalized text
    pub text: String,
    /// Origin x
    pub x: f32,
    /// Baseline y
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Signed font height after all transforms
    pub height: f32,
    pub bold: bool,
    pub italic: bool,
}

impl GlyphRun {
    /// Unsigned font height.
    pub fn magnitude(&self) -> f32 {
        self.height.abs()
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y + self.magnitude()
    }
}

/// An image XObject painted into the unit square of the active transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Image resource name
    pub resource: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Something painted on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Run(GlyphRun),
    Image(ImagePlacement),
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line: Matrix,
    font: String,
    size: f32,
    leading: Option<f32>,
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line = Matrix::IDENTITY;
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::translation(tx, ty).multiply(&self.line);
        self.matrix = self.line;
    }

    fn next_line(&mut self) {
        let leading = self
            .leading
            .unwrap_or(self.size * DEFAULT_LEADING_FACTOR);
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, width: f32) {
        self.matrix = Matrix::translation(width, 0.0).multiply(&self.matrix);
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line: Matrix::IDENTITY,
            font: String::new(),
            size: 0.0,
            leading: None,
        }
    }
}

/// Replay a page and collect what it paints, in paint order.
pub fn interpret(page: &PageContent<'_>, normalizer: &TextNormalizer) -> Vec<PageEvent> {
    let mut transform = TransformState::new();
    let mut text = TextState::default();
    let mut fonts: HashMap<String, FontInfo> = HashMap::new();
    let mut events = Vec::new();

    for (index, op) in page.operators.iter().enumerate() {
        match op {
            Operator::Save => transform.save(),
            Operator::Restore => {
                if let Err(e) = transform.restore() {
                    log::debug!("page {} op {} ({}): {}", page.number, index, op.mnemonic(), e);
                }
            }
            Operator::Transform(m) => {
                if let Err(e) = transform.transform(m) {
                    log::warn!(
                        "page {} op {} ({}): {} {:?}",
                        page.number,
                        index,
                        op.mnemonic(),
                        e,
                        m
                    );
                }
            }
            Operator::BeginText => text.begin(),
            Operator::EndText => {}
            Operator::SetFont(f) => {
                text.font = f.resource.clone();
                text.size = f.size;
            }
            Operator::SetLeading(leading) => text.leading = Some(*leading),
            Operator::SetTextMatrix(m) => text.set_matrix(*m),
            Operator::MoveText(m) => {
                text.move_line(m.tx, m.ty);
                if m.set_leading {
                    text.leading = Some(-m.ty);
                }
            }
            Operator::NextLine => text.next_line(),
            Operator::ShowText(show) => {
                let Some(item) = page.text_items.get(show.item) else {
                    log::debug!(
                        "page {} op {} ({}): text item {} missing",
                        page.number,
                        index,
                        op.mnemonic(),
                        show.item
                    );
                    continue;
                };

                let advance = item
                    .width
                    .unwrap_or(item.text.chars().count() as f32 * GLYPH_WIDTH_FACTOR * text.size);
                let active = transform.active();
                let (x, y) = transform.apply(text.matrix.e, text.matrix.f);
                let height = text.size * text.matrix.vertical_scale() * active.d;
                let width = (advance * text.matrix.a * active.a).abs();
                text.advance(advance);

                let content = normalizer.normalize(&item.text);
                if content.is_empty() || height == 0.0 || !height.is_finite() {
                    continue;
                }

                let resource = if item.font.is_empty() {
                    text.font.as_str()
                } else {
                    item.font.as_str()
                };
                let font = fonts
                    .entry(resource.to_string())
                    .or_insert_with(|| page.resources.font(resource).unwrap_or_default());

                events.push(PageEvent::Run(GlyphRun {
                    item: show.item,
                    text: content,
                    x,
                    y,
                    width,
                    height,
                    bold: font.bold,
                    italic: font.italic,
                }));
            }
            Operator::PaintImage(paint) => {
                let m = transform.active();
                events.push(PageEvent::Image(ImagePlacement {
                    resource: paint.resource.clone(),
                    x: m.e,
                    y: m.f,
                    width: m.a.abs(),
                    height: m.d.abs(),
                }));
            }
        }
    }

    if transform.depth() > 0 {
        log::debug!("page {}: {} saves never restored", page.number, transform.depth());
    }
    events
}
