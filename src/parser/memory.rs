//! In-memory page source.
//!
//! Pages are assembled by hand from operators and text items. Used by the
//! test suites and benchmarks, and handy for feeding the layout engine from
//! something other than a PDF file.

use std::collections::HashMap;

use super::backend::{AnnotationRecord, FontInfo, PageContent, PageSource, ResourceLookup, TextItem};
use super::ops::{Matrix, MoveText, Operator, PaintImage, SetFont, ShowText};
use crate::error::{Error, Result};
use crate::model::RasterImage;

/// One hand-built page.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub width: f32,
    pub height: f32,
    pub operators: Vec<Operator>,
    pub text_items: Vec<TextItem>,
    pub annotations: Vec<AnnotationRecord>,
    pub fonts: HashMap<String, FontInfo>,
    pub images: HashMap<String, RasterImage>,
}

impl MemoryPage {
    /// Create an empty page of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            operators: Vec::new(),
            text_items: Vec::new(),
            annotations: Vec::new(),
            fonts: HashMap::new(),
            images: HashMap::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Register a font resource.
    pub fn with_font(mut self, resource: impl Into<String>, base_font: &str) -> Self {
        self.fonts
            .insert(resource.into(), FontInfo::from_base_font(base_font));
        self
    }

    /// Register an image resource.
    pub fn with_image(mut self, resource: impl Into<String>, image: RasterImage) -> Self {
        self.images.insert(resource.into(), image);
        self
    }

    /// Attach an annotation.
    pub fn with_annotation(mut self, annotation: AnnotationRecord) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Append a raw operator.
    pub fn op(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    /// Paint `text` in its own text object at `(x, y)` with font `font` at `size`.
    pub fn text_at(mut self, font: &str, size: f32, x: f32, y: f32, text: &str) -> Self {
        self.operators.push(Operator::BeginText);
        self.operators.push(Operator::SetFont(SetFont {
            resource: font.to_string(),
            size,
        }));
        self.operators
            .push(Operator::SetTextMatrix(Matrix::new(1.0, 0.0, 0.0, 1.0, x, y)));
        self.push_show(font, text);
        self.operators.push(Operator::EndText);
        self
    }

    /// Paint `text` right after the previous run, inside an open text object.
    pub fn show(mut self, font: &str, text: &str) -> Self {
        self.push_show(font, text);
        self
    }

    /// Move to the next line by `(tx, ty)` and paint `text`.
    pub fn line(mut self, font: &str, tx: f32, ty: f32, text: &str) -> Self {
        self.operators.push(Operator::MoveText(MoveText {
            tx,
            ty,
            set_leading: false,
        }));
        self.push_show(font, text);
        self
    }

    /// Paint image `resource` scaled to `width` x `height` at `(x, y)`.
    pub fn image_at(mut self, resource: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.operators.push(Operator::Save);
        self.operators
            .push(Operator::Transform(Matrix::new(width, 0.0, 0.0, height, x, y)));
        self.operators.push(Operator::PaintImage(PaintImage {
            resource: resource.to_string(),
        }));
        self.operators.push(Operator::Restore);
        self
    }

    fn push_show(&mut self, font: &str, text: &str) {
        self.text_items.push(TextItem::new(text, font));
        self.operators.push(Operator::ShowText(ShowText {
            item: self.text_items.len() - 1,
        }));
    }
}

/// A [`PageSource`] over hand-built pages.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<MemoryPage>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from pages.
    pub fn from_pages(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Append a page.
    pub fn push(&mut self, page: MemoryPage) {
        self.pages.push(page);
    }
}

struct MemoryResources<'a> {
    page: &'a MemoryPage,
}

impl ResourceLookup for MemoryResources<'_> {
    fn font(&self, resource: &str) -> Option<FontInfo> {
        self.page.fonts.get(resource).cloned()
    }

    fn image(&self, resource: &str) -> Result<RasterImage> {
        self.page
            .images
            .get(resource)
            .cloned()
            .ok_or_else(|| Error::ImageExtract(format!("no image resource {}", resource)))
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<PageContent<'_>> {
        let page = number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or(Error::PageOutOfRange(number, self.page_count()))?;
        Ok(PageContent {
            number,
            width: page.width,
            height: page.height,
            operators: page.operators.clone(),
            text_items: page.text_items.clone(),
            annotations: page.annotations.clone(),
            resources: Box::new(MemoryResources { page }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_lookup() {
        let source = MemorySource::from_pages(vec![MemoryPage::letter().text_at("F1", 10.0, 72.0, 700.0, "Hi")]);
        assert_eq!(source.page_count(), 1);

        let page = source.page(1).unwrap();
        assert_eq!(page.text_items.len(), 1);
        assert_eq!(page.operators.len(), 5);

        assert!(matches!(source.page(0), Err(Error::PageOutOfRange(0, 1))));
        assert!(matches!(source.page(2), Err(Error::PageOutOfRange(2, 1))));
    }

    #[test]
    fn test_resources() {
        let source = MemorySource::from_pages(vec![MemoryPage::letter().with_font("F2", "Helvetica-Bold")]);
        let page = source.page(1).unwrap();
        assert!(page.resources.font("F2").unwrap().bold);
        assert!(page.resources.font("F9").is_none());
        assert!(page.resources.image("Im1").is_err());
    }
}
