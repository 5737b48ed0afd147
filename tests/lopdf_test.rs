//! Integration tests over real PDF files built with lopdf.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tempfile::TempDir;

use pdfnote::parser::ResourceLookup;
use pdfnote::{
    convert_file, convert_file_with_stats, statistics_for_file, BatchConverter, BatchOptions,
    DocumentStatus, LopdfBackend, OverwritePolicy, PageSource, ParseOptions,
};

/// Minimal document writer: one Helvetica font, optional image, Letter pages.
struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0, 255, 255, 0],
        ));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        });
        Self {
            doc,
            pages_id,
            resources_id,
            kids: Vec::new(),
        }
    }

    fn annotation(&mut self, dict: Dictionary) -> ObjectId {
        self.doc.add_object(dict)
    }

    fn page(mut self, operations: Vec<Operation>, annotations: &[ObjectId]) -> Self {
        let content = Content { operations }.encode().unwrap();
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        if !annotations.is_empty() {
            let refs: Vec<Object> = annotations.iter().map(|id| Object::Reference(*id)).collect();
            page.set("Annots", refs);
        }
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        self
    }

    fn save(mut self, path: &Path) {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.save(path).unwrap();
    }
}

/// `BT /F1 size Tf x y Td (first) Tj 0 -12 Td (next) Tj ... ET`
fn text_block(size: i64, x: i64, y: i64, lines: &[&str]) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push(Operation::new("Td", vec![0.into(), (-12).into()]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

fn paint_image(x: i64, y: i64, w: i64, h: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec!["Im1".into()]),
        Operation::new("Q", vec![]),
    ]
}

fn single_page(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    PdfBuilder::new()
        .page(text_block(10, 72, 700, &[text]), &[])
        .save(&path);
    path
}

#[test]
fn test_backend_decodes_page() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("page.pdf");
    PdfBuilder::new()
        .page(text_block(10, 72, 700, &["Hello", "World"]), &[])
        .save(&path);

    let backend = LopdfBackend::load_file(&path).unwrap();
    assert!(!backend.is_encrypted());
    assert_eq!(backend.page_count(), 1);

    let page = backend.page(1).unwrap();
    assert_eq!(page.width, 612.0);
    assert_eq!(page.height, 792.0);
    let texts: Vec<&str> = page.text_items.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", "World"]);
    assert_eq!(page.text_items[0].font, "F1");
    assert!(page.annotations.is_empty());
    let font = page.resources.font("F1").unwrap();
    assert_eq!(font.name, "Helvetica");
    assert!(!font.bold);

    assert!(backend.page(2).is_err());
}

#[test]
fn test_convert_file_paragraph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("body.pdf");
    PdfBuilder::new()
        .page(
            text_block(10, 72, 700, &["The quick brown fox", "jumps over the dog."]),
            &[],
        )
        .save(&path);

    let markdown = convert_file(&path, ParseOptions::default()).unwrap();
    assert_eq!(markdown, "The quick brown fox jumps over the dog.\n\n");
}

#[test]
fn test_highlight_with_reply_becomes_footnote() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("annotated.pdf");

    let mut builder = PdfBuilder::new();
    let highlight = builder.annotation(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => vec![60.into(), 697.into(), 300.into(), 711.into()],
        "QuadPoints" => vec![
            60.into(), 711.into(), 300.into(), 711.into(),
            60.into(), 697.into(), 300.into(), 697.into(),
        ],
        "Contents" => Object::string_literal("Check this"),
    });
    let reply = builder.annotation(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![300.into(), 700.into(), 320.into(), 720.into()],
        "IRT" => highlight,
        "Contents" => Object::string_literal("Sure"),
    });
    let popup = builder.annotation(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Popup",
        "Parent" => highlight,
    });
    builder
        .page(
            text_block(10, 72, 700, &["Highlighted sentence"]),
            &[highlight, reply, popup],
        )
        .save(&path);

    let backend = LopdfBackend::load_file(&path).unwrap();
    let page = backend.page(1).unwrap();
    assert_eq!(page.annotations.len(), 2);
    assert_eq!(page.annotations[1].in_reply_to, page.annotations[0].id);

    let result = convert_file_with_stats(&path, ParseOptions::default()).unwrap();
    assert_eq!(
        result.content,
        "==Highlighted sentence==[^1]\n\n[^1]: p. 1: Check this\n    Sure\n"
    );
    assert_eq!(result.stats.highlight_count, 1);
    assert_eq!(result.stats.footnote_count, 1);

    let plain = convert_file(&path, ParseOptions::new().with_annotations(false)).unwrap();
    assert_eq!(plain, "Highlighted sentence\n\n");
}

#[test]
fn test_statistics_for_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stats.pdf");
    PdfBuilder::new()
        .page(text_block(10, 72, 700, &["one", "two", "three"]), &[])
        .page(text_block(10, 90, 700, &["four", "five"]), &[])
        .save(&path);

    let stats = statistics_for_file(&path).unwrap();
    assert_eq!(stats.modal_glyph_height, 10.0);
    assert_eq!(stats.left_margin_odd, 72.0);
    assert_eq!(stats.left_margin_even, 90.0);
    assert!(stats.line_spacing_max < stats.line_spacing_min);
    assert!(stats.line_spacing_min < 0.0);
}

#[test]
fn test_convert_file_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.pdf");
    fs::write(&path, "just some text").unwrap();
    assert!(convert_file(&path, ParseOptions::default()).is_err());
}

#[test]
fn test_batch_writes_markdown_and_images() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();

    let mut ops = text_block(10, 72, 700, &["Figure below"]);
    ops.extend(paint_image(72, 400, 200, 100));
    PdfBuilder::new().page(ops, &[]).save(&input.join("paper.pdf"));
    single_page(&input, "other.pdf", "Other paper");
    fs::write(input.join("readme.txt"), "not a pdf").unwrap();

    let converter = BatchConverter::new(BatchOptions::default());
    let report = converter.run(&[input.clone()], Some(&output)).unwrap();
    assert_eq!(report.converted(), 2);
    assert_eq!(report.failed(), 0);

    let paper = fs::read_to_string(output.join("paper.md")).unwrap();
    assert_eq!(
        paper,
        "Figure below\n\n![image](images/paper-p1-Im1-0.png)\n\n"
    );
    let png = fs::read(output.join("images").join("paper-p1-Im1-0.png")).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0, [255, 255, 255, 255]);

    assert_eq!(
        fs::read_to_string(output.join("other.md")).unwrap(),
        "Other paper\n\n"
    );
    assert_eq!(report.total_stats().image_count, 1);
}

#[test]
fn test_batch_skip_existing() {
    let dir = TempDir::new().unwrap();
    let input = single_page(dir.path(), "doc.pdf", "Fresh text");
    let output = dir.path().join("doc.md");
    fs::write(&output, "hand edited").unwrap();

    let options = BatchOptions {
        overwrite: OverwritePolicy::Skip,
        ..BatchOptions::default()
    };
    let report = BatchConverter::new(options).run(&[input.clone()], None).unwrap();
    assert_eq!(report.skipped(), 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "hand edited");

    let report = BatchConverter::new(BatchOptions::default())
        .run(&[input], None)
        .unwrap();
    assert_eq!(report.converted(), 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "Fresh text\n\n");
}

#[test]
fn test_batch_reports_broken_file_and_continues() {
    let dir = TempDir::new().unwrap();
    let good = single_page(dir.path(), "good.pdf", "Good text");
    let bad = dir.path().join("bad.pdf");
    fs::write(&bad, "this is not a pdf at all").unwrap();

    let report = BatchConverter::new(BatchOptions::default())
        .run(&[bad.clone(), good.clone()], None)
        .unwrap();
    assert_eq!(report.documents.len(), 2);
    assert!(matches!(report.documents[0].status, DocumentStatus::Failed(_)));
    assert!(report.documents[0].outputs.is_empty());
    assert_eq!(report.documents[1].status, DocumentStatus::Converted);
    assert_eq!(report.documents[1].input, good);
}

#[test]
fn test_batch_size_limit() {
    let dir = TempDir::new().unwrap();
    let big = dir.path().join("big.pdf");
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(2 * 1024 * 1024, b'%');
    fs::write(&big, data).unwrap();

    let options = BatchOptions {
        max_file_size_mb: 1,
        ..BatchOptions::default()
    };
    let report = BatchConverter::new(options).run(&[big.clone()], None).unwrap();
    assert_eq!(report.skipped(), 1);
    assert!(matches!(
        &report.documents[0].status,
        DocumentStatus::Skipped(reason) if reason.contains("1 MB")
    ));
    assert!(!dir.path().join("big.md").exists());

    let options = BatchOptions {
        max_file_size_mb: 0,
        ..BatchOptions::default()
    };
    let report = BatchConverter::new(options).run(&[big], None).unwrap();
    assert_eq!(report.failed(), 1);
}

#[test]
fn test_batch_chunked_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.pdf");
    PdfBuilder::new()
        .page(text_block(10, 72, 700, &["Page one text"]), &[])
        .page(text_block(10, 72, 700, &["Page two text"]), &[])
        .page(text_block(10, 72, 700, &["Page three text"]), &[])
        .save(&path);

    let options = BatchOptions {
        chunk_size_bytes: 20,
        ..BatchOptions::default()
    };
    let report = BatchConverter::new(options).run(&[path], None).unwrap();
    let outputs = &report.documents[0].outputs;
    assert_eq!(
        outputs,
        &vec![
            dir.path().join("long.md"),
            dir.path().join("long-2.md"),
            dir.path().join("long-3.md"),
        ]
    );
    assert_eq!(fs::read_to_string(&outputs[1]).unwrap(), "Page two text\n\n");
    assert_eq!(report.documents[0].stats.as_ref().unwrap().page_count, 3);
}

#[test]
fn test_batch_parallel_keeps_input_order() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (1..=4)
        .map(|i| single_page(dir.path(), &format!("doc{}.pdf", i), &format!("Document {}", i)))
        .collect();
    let output = dir.path().join("out");

    let options = BatchOptions {
        parallel: true,
        ..BatchOptions::default()
    };
    let report = BatchConverter::new(options).run(&inputs, Some(&output)).unwrap();
    assert_eq!(report.converted(), 4);
    for (i, outcome) in report.documents.iter().enumerate() {
        assert_eq!(outcome.input, inputs[i]);
        let text = fs::read_to_string(&outcome.outputs[0]).unwrap();
        assert_eq!(text, format!("Document {}\n\n", i + 1));
    }
}

#[test]
fn test_batch_cancelled_before_start() {
    let dir = TempDir::new().unwrap();
    let input = single_page(dir.path(), "doc.pdf", "Some text");

    let converter = BatchConverter::new(BatchOptions::default());
    converter.cancellation_token().cancel();
    let report = converter.run(&[input], None).unwrap();
    assert_eq!(report.cancelled(), 1);
    assert!(!dir.path().join("doc.md").exists());
}
