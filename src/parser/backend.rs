//! Page source abstraction layer.
//!
//! Provides a trait-based interface for page access, isolating the
//! concrete PDF library (lopdf) from the interpreter and layout logic.
//! A page is handed over as a closed operator list, the text items those
//! operators paint, the page's annotations and a resource lookup.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object, ObjectId, Stream};

use super::ops::{Matrix, MoveText, Operator, PaintImage, SetFont, ShowText};
use crate::error::{Error, Result};
use crate::model::{ColorKind, RasterImage};
use crate::render::is_spaceless_script_char;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Parent chain depth limit when resolving inherited page attributes.
const MAX_INHERIT_DEPTH: usize = 32;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text fragment painted by one show-text operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Decoded text
    pub text: String,
    /// Font resource active when the item was painted
    pub font: String,
    /// Advance width in unscaled text space, when the source knows it
    pub width: Option<f32>,
}

impl TextItem {
    /// Create a text item without a known width.
    pub fn new(text: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            width: None,
        }
    }
}

/// An axis-aligned annotation quad in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Quad {
    /// Bounding box of a PDF quadrilateral given as four corner points.
    pub fn from_points(points: &[f32]) -> Option<Self> {
        if points.len() != 8 || points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        let xs = [points[0], points[2], points[4], points[6]];
        let ys = [points[1], points[3], points[5], points[7]];
        Some(Self {
            left: xs.iter().copied().fold(f32::INFINITY, f32::min),
            right: xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            bottom: ys.iter().copied().fold(f32::INFINITY, f32::min),
            top: ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        })
    }
}

/// A highlight or a reply attached to one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationRecord {
    /// Identifier other annotations reply to
    pub id: Option<String>,
    /// Highlighted regions, in reading order
    pub quads: Vec<Quad>,
    /// Free-text comment
    pub contents: Option<String>,
    /// Identifier of the annotation this one replies to
    pub in_reply_to: Option<String>,
}

/// Font metadata exposed to the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontInfo {
    /// Base font name without subset prefix
    pub name: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontInfo {
    /// Derive style flags from a base font name such as `ABCDEF+Times-BoldItalic`.
    pub fn from_base_font(base_font: &str) -> Self {
        let name = match base_font.split_once('+') {
            Some((prefix, rest)) if prefix.len() == 6 => rest,
            _ => base_font,
        };
        let lower = name.to_lowercase();
        Self {
            name: name.to_string(),
            bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }
}

/// Named resources of one page.
pub trait ResourceLookup {
    /// Font metadata for a font resource name.
    fn font(&self, resource: &str) -> Option<FontInfo>;

    /// Decode an image resource.
    fn image(&self, resource: &str) -> Result<RasterImage>;
}

/// Everything the interpreter needs from one page.
pub struct PageContent<'a> {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Drawing program
    pub operators: Vec<Operator>,
    /// Text painted by [`Operator::ShowText`]
    pub text_items: Vec<TextItem>,
    /// Highlights and replies
    pub annotations: Vec<AnnotationRecord>,
    /// Font and image lookup
    pub resources: Box<dyn ResourceLookup + 'a>,
}

/// Abstract interface for page access.
///
/// Implementations provide page enumeration and per-page decoding
/// without exposing any concrete PDF library types.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Decode page `number` (1-indexed).
    fn page(&self, number: u32) -> Result<PageContent<'_>>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Helper: extract a number from an operand.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Option<Vec<f32>> {
    operands.iter().map(number).collect()
}

fn object_key(id: ObjectId) -> String {
    format!("{} {} R", id.0, id.1)
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PageSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look up a page attribute, walking `/Parent` for inherited ones.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return self.resolve(obj);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn media_box(&self, page_id: ObjectId) -> (f32, f32) {
        let values = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| numbers(arr));
        match values.as_deref() {
            Some([x0, y0, x1, y1]) if (x1 - x0).abs() > 0.0 && (y1 - y0).abs() > 0.0 => {
                ((x1 - x0).abs(), (y1 - y0).abs())
            }
            _ => {
                log::debug!("page {:?}: no usable MediaBox, assuming Letter", page_id);
                DEFAULT_PAGE_SIZE
            }
        }
    }

    fn page_content_bytes(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            // A page without content is blank, not broken
            Err(_) => return Ok(Vec::new()),
        };

        let mut content = Vec::new();
        let mut push_stream = |obj: &Object| -> Result<()> {
            match self.resolve(obj) {
                Some(Object::Stream(s)) => {
                    let data = if s.dict.has(b"Filter") {
                        s.decompressed_content()?
                    } else {
                        s.content.clone()
                    };
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                    Ok(())
                }
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        };

        match self.resolve(contents) {
            Some(Object::Array(arr)) => {
                for obj in arr {
                    push_stream(obj)?;
                }
            }
            Some(_) => push_stream(contents)?,
            None => return Err(Error::PdfParse("Invalid content stream".to_string())),
        }
        Ok(content)
    }

    fn xobject_images(&self, page_id: ObjectId) -> HashMap<String, ObjectId> {
        let mut images = HashMap::new();
        let xobjects = self
            .inherited(page_id, b"Resources")
            .and_then(|r| r.as_dict().ok())
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| self.resolve(x))
            .and_then(|x| x.as_dict().ok());
        let Some(xobjects) = xobjects else {
            return images;
        };

        for (name, obj) in xobjects.iter() {
            let Ok(id) = obj.as_reference() else {
                continue;
            };
            let is_image = matches!(
                self.doc.get_object(id),
                Ok(Object::Stream(s)) if s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
            );
            if is_image {
                images.insert(String::from_utf8_lossy(name).to_string(), id);
            }
        }
        images
    }

    fn annotations(&self, page_id: ObjectId, page: u32) -> Vec<AnnotationRecord> {
        let annots = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"Annots").ok())
            .and_then(|a| self.resolve(a))
            .and_then(|a| a.as_array().ok());
        let Some(annots) = annots else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for (index, entry) in annots.iter().enumerate() {
            let (object_id, dict) = match entry {
                Object::Reference(id) => match self.doc.get_dictionary(*id) {
                    Ok(dict) => (Some(*id), dict),
                    Err(e) => {
                        log::debug!("page {}: annotation {} unreadable: {}", page, index, e);
                        continue;
                    }
                },
                Object::Dictionary(dict) => (None, dict),
                _ => {
                    log::debug!("page {}: annotation {} is not a dictionary", page, index);
                    continue;
                }
            };

            let subtype = dict.get(b"Subtype").and_then(Object::as_name).unwrap_or(b"");
            if subtype == b"Popup" {
                continue;
            }

            let in_reply_to = dict
                .get(b"IRT")
                .and_then(Object::as_reference)
                .ok()
                .map(object_key);
            let quads = if subtype == b"Highlight" {
                self.quads(dict)
            } else {
                Vec::new()
            };
            if quads.is_empty() && in_reply_to.is_none() {
                log::debug!(
                    "page {}: skipping {} annotation {}",
                    page,
                    String::from_utf8_lossy(subtype),
                    index
                );
                continue;
            }

            let contents = dict
                .get(b"Contents")
                .ok()
                .and_then(|c| self.resolve(c))
                .and_then(|c| match c {
                    Object::String(bytes, _) => Some(decode_text_simple(bytes)),
                    _ => None,
                })
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            let id = object_id.map(object_key).or_else(|| {
                dict.get(b"NM").ok().and_then(|nm| match nm {
                    Object::String(bytes, _) => Some(decode_text_simple(bytes)),
                    _ => None,
                })
            });

            records.push(AnnotationRecord {
                id,
                quads,
                contents,
                in_reply_to,
            });
        }
        records
    }

    fn quads(&self, dict: &Dictionary) -> Vec<Quad> {
        let points = dict
            .get(b"QuadPoints")
            .ok()
            .and_then(|q| self.resolve(q))
            .and_then(|q| q.as_array().ok())
            .and_then(|arr| numbers(arr));
        if let Some(points) = points {
            let quads: Vec<Quad> = points.chunks_exact(8).filter_map(Quad::from_points).collect();
            if !quads.is_empty() {
                return quads;
            }
        }

        // No quads: fall back to the annotation rectangle
        let rect = dict
            .get(b"Rect")
            .ok()
            .and_then(|r| self.resolve(r))
            .and_then(|r| r.as_array().ok())
            .and_then(|arr| numbers(arr));
        match rect.as_deref() {
            Some([x0, y0, x1, y1]) => vec![Quad {
                left: x0.min(*x1),
                right: x0.max(*x1),
                bottom: y0.min(*y1),
                top: y0.max(*y1),
            }],
            _ => Vec::new(),
        }
    }

    fn decode_operators(
        &self,
        page_id: ObjectId,
        page: u32,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        images: &HashMap<String, ObjectId>,
    ) -> Result<(Vec<Operator>, Vec<TextItem>)> {
        let data = self.page_content_bytes(page_id)?;
        let content = lopdf::content::Content::decode(&data)?;

        let mut encodings: HashMap<Vec<u8>, Option<Encoding>> = HashMap::new();
        let mut current_font: Vec<u8> = Vec::new();
        let mut operators = Vec::with_capacity(content.operations.len());
        let mut items = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            let decoded = match op.operator.as_str() {
                "q" => Some(Operator::Save),
                "Q" => Some(Operator::Restore),
                "cm" => numbers(operands)
                    .and_then(|v| Matrix::from_slice(&v))
                    .map(Operator::Transform),
                "BT" => Some(Operator::BeginText),
                "ET" => Some(Operator::EndText),
                "Tf" => match (operands.first(), operands.get(1).and_then(number)) {
                    (Some(Object::Name(name)), Some(size)) => {
                        current_font = name.clone();
                        Some(Operator::SetFont(SetFont {
                            resource: String::from_utf8_lossy(name).to_string(),
                            size,
                        }))
                    }
                    _ => None,
                },
                "TL" => operands.first().and_then(number).map(Operator::SetLeading),
                "Tm" => numbers(operands)
                    .and_then(|v| Matrix::from_slice(&v))
                    .map(Operator::SetTextMatrix),
                "Td" | "TD" => match numbers(operands).as_deref() {
                    Some([tx, ty]) => Some(Operator::MoveText(MoveText {
                        tx: *tx,
                        ty: *ty,
                        set_leading: op.operator == "TD",
                    })),
                    _ => None,
                },
                "T*" => Some(Operator::NextLine),
                "Tj" | "'" | "\"" | "TJ" => {
                    let encoding = encodings.entry(current_font.clone()).or_insert_with(|| {
                        fonts
                            .get(&current_font)
                            .and_then(|f| f.get_font_encoding(&self.doc).ok())
                    });
                    let text = match op.operator.as_str() {
                        "TJ" => operands
                            .first()
                            .and_then(|o| o.as_array().ok())
                            .map(|arr| decode_tj(arr, encoding.as_ref())),
                        "\"" => operands.get(2).and_then(|o| decode_string(o, encoding.as_ref())),
                        _ => operands.first().and_then(|o| decode_string(o, encoding.as_ref())),
                    };
                    match text {
                        Some(text) => {
                            if op.operator == "'" || op.operator == "\"" {
                                operators.push(Operator::NextLine);
                            }
                            items.push(TextItem::new(
                                text,
                                String::from_utf8_lossy(&current_font).to_string(),
                            ));
                            Some(Operator::ShowText(ShowText {
                                item: items.len() - 1,
                            }))
                        }
                        None => None,
                    }
                }
                "Do" => match operands.first() {
                    Some(Object::Name(name)) => {
                        let resource = String::from_utf8_lossy(name).to_string();
                        if images.contains_key(&resource) {
                            Some(Operator::PaintImage(PaintImage { resource }))
                        } else {
                            log::debug!("page {}: Do {} is not an image XObject", page, resource);
                            continue;
                        }
                    }
                    _ => None,
                },
                _ => continue,
            };

            match decoded {
                Some(operator) => operators.push(operator),
                None => log::debug!(
                    "page {}: malformed {} operands {:?}",
                    page,
                    op.operator,
                    operands
                ),
            }
        }

        Ok((operators, items))
    }
}

fn decode_string(obj: &Object, encoding: Option<&Encoding>) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_bytes(bytes, encoding)),
        _ => None,
    }
}

fn decode_bytes(bytes: &[u8], encoding: Option<&Encoding>) -> String {
    encoding
        .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
        .unwrap_or_else(|| decode_text_simple(bytes))
}

/// Join a TJ array, turning large positioning gaps into spaces.
fn decode_tj(arr: &[Object], encoding: Option<&Encoding>) -> String {
    let mut combined = String::new();
    for item in arr {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode_bytes(bytes, encoding)),
            other => {
                let Some(n) = number(other) else { continue };
                // Negative values advance to the right
                if -n > TJ_SPACE_THRESHOLD
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
        }
    }
    combined
}

impl PageSource for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<PageContent<'_>> {
        let page_id = *self
            .pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, self.page_count()))?;

        let (width, height) = self.media_box(page_id);
        let lopdf_fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let images = self.xobject_images(page_id);
        let (operators, text_items) = self.decode_operators(page_id, number, &lopdf_fonts, &images)?;
        let annotations = self.annotations(page_id, number);

        let fonts = lopdf_fonts
            .iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .and_then(Object::as_name)
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|_| "Unknown".to_string());
                (
                    String::from_utf8_lossy(name).to_string(),
                    FontInfo::from_base_font(&base_font),
                )
            })
            .collect();

        log::debug!(
            "page {}: {} operators, {} text items, {} annotations, {} images",
            number,
            operators.len(),
            text_items.len(),
            annotations.len(),
            images.len()
        );

        Ok(PageContent {
            number,
            width,
            height,
            operators,
            text_items,
            annotations,
            resources: Box::new(LopdfResources {
                doc: &self.doc,
                fonts,
                images,
            }),
        })
    }
}

/// Resource lookup for one lopdf page.
struct LopdfResources<'a> {
    doc: &'a LopdfDocument,
    fonts: HashMap<String, FontInfo>,
    images: HashMap<String, ObjectId>,
}

impl ResourceLookup for LopdfResources<'_> {
    fn font(&self, resource: &str) -> Option<FontInfo> {
        self.fonts.get(resource).cloned()
    }

    fn image(&self, resource: &str) -> Result<RasterImage> {
        let id = self
            .images
            .get(resource)
            .ok_or_else(|| Error::ImageExtract(format!("no image resource {}", resource)))?;
        match self.doc.get_object(*id)? {
            Object::Stream(stream) => decode_image_stream(self.doc, stream),
            _ => Err(Error::ImageExtract(format!("{} is not a stream", resource))),
        }
    }
}

fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

fn color_components(doc: &LopdfDocument, color_space: Option<&Object>) -> Result<usize> {
    let resolved = match color_space {
        Some(Object::Reference(id)) => Some(doc.get_object(*id)?),
        other => other,
    };
    let unsupported = |what: &[u8]| {
        Error::ImageExtract(format!(
            "unsupported color space {}",
            String::from_utf8_lossy(what)
        ))
    };
    match resolved {
        Some(Object::Name(name)) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            other => Err(unsupported(other)),
        },
        Some(Object::Array(arr)) => {
            let family = arr.first().and_then(|o| o.as_name().ok()).unwrap_or(b"");
            match family {
                b"CalGray" => Ok(1),
                b"CalRGB" => Ok(3),
                b"ICCBased" => {
                    let n = arr
                        .get(1)
                        .and_then(|o| o.as_reference().ok())
                        .and_then(|id| doc.get_object(id).ok())
                        .and_then(|o| o.as_stream().ok())
                        .and_then(|s| s.dict.get(b"N").ok())
                        .and_then(number);
                    match n {
                        Some(n) if n == 1.0 => Ok(1),
                        Some(n) if n == 3.0 => Ok(3),
                        _ => Err(unsupported(b"ICCBased".as_slice())),
                    }
                }
                other => Err(unsupported(other)),
            }
        }
        _ => Err(Error::ImageExtract("missing color space".to_string())),
    }
}

/// Decode an image XObject into one of the supported sample layouts.
fn decode_image_stream(doc: &LopdfDocument, stream: &Stream) -> Result<RasterImage> {
    let dict = &stream.dict;
    let filters = stream_filters(dict);

    if filters.iter().any(|f| f.as_slice() == b"DCTDecode") {
        let jpeg = if filters.len() > 1 {
            stream.decompressed_content()?
        } else {
            stream.content.clone()
        };
        let rgb = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        return Ok(RasterImage::new(ColorKind::Rgb24Bpp, width, height, rgb.into_raw()));
    }

    if matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true))) {
        return Err(Error::ImageExtract("stencil masks are not supported".to_string()));
    }

    let dimension = |key: &[u8]| -> Result<u32> {
        dict.get(key)
            .ok()
            .and_then(number)
            .filter(|v| *v > 0.0)
            .map(|v| v as u32)
            .ok_or_else(|| {
                Error::ImageExtract(format!("missing {}", String::from_utf8_lossy(key)))
            })
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;
    let bpc = dict.get(b"BitsPerComponent").ok().and_then(number).unwrap_or(8.0) as u32;
    let components = color_components(doc, dict.get(b"ColorSpace").ok())?;

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream.decompressed_content()?
    };

    match (components, bpc) {
        (1, 1) => Ok(RasterImage::new(ColorKind::Grayscale1Bpp, width, height, data)),
        (1, 8) => {
            let rgb = data.iter().flat_map(|&v| [v, v, v]).collect();
            Ok(RasterImage::new(ColorKind::Rgb24Bpp, width, height, rgb))
        }
        (3, 8) => Ok(RasterImage::new(ColorKind::Rgb24Bpp, width, height, data)),
        (n, bits) => Err(Error::ImageExtract(format!(
            "unsupported layout: {} components at {} bits",
            n, bits
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        // UTF-16BE BOM + "Hi"
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_number() {
        assert_eq!(number(&Object::Integer(42)), Some(42.0));
        assert_eq!(number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(number(&Object::Null), None);
    }

    #[test]
    fn test_font_info_from_base_font() {
        let font = FontInfo::from_base_font("ABCDEF+Times-BoldItalic");
        assert_eq!(font.name, "Times-BoldItalic");
        assert!(font.bold);
        assert!(font.italic);

        let font = FontInfo::from_base_font("Helvetica-Oblique");
        assert!(!font.bold);
        assert!(font.italic);

        let font = FontInfo::from_base_font("Arial Black");
        assert!(font.bold);
    }

    #[test]
    fn test_quad_from_points() {
        let quad = Quad::from_points(&[10.0, 20.0, 50.0, 20.0, 10.0, 8.0, 50.0, 8.0]).unwrap();
        assert_eq!(quad.left, 10.0);
        assert_eq!(quad.right, 50.0);
        assert_eq!(quad.bottom, 8.0);
        assert_eq!(quad.top, 20.0);
        assert!(Quad::from_points(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_decode_tj_spacing() {
        let arr = vec![
            Object::string_literal("Hello"),
            Object::Integer(-250),
            Object::string_literal("world"),
            Object::Integer(-50),
            Object::string_literal("!"),
        ];
        assert_eq!(decode_tj(&arr, None), "Hello world!");
    }

    #[test]
    fn test_decode_tj_cjk_no_space() {
        let arr = vec![
            Object::string_literal("漢"),
            Object::Integer(-300),
            Object::string_literal("字"),
        ];
        assert_eq!(decode_tj(&arr, None), "漢字");
    }
}
