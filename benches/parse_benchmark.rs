//! Benchmarks for pdfnote conversion performance.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic: in-memory pages for the layout pipeline and a
//! hand-written PDF header for format sniffing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdfnote::parser::{AnnotationRecord, Quad};
use pdfnote::{DocumentProcessor, MemoryPage, MemorySource, ParseOptions};

/// Creates a document of body paragraphs with one commented highlight per page.
fn create_test_source(page_count: usize) -> MemorySource {
    let pages = (0..page_count)
        .map(|i| {
            let mut page = MemoryPage::letter()
                .with_font("F1", "Times-Roman")
                .with_font("F2", "Times-Bold")
                .text_at("F2", 16.0, 72.0, 740.0, &format!("Section {}", i + 1));
            for paragraph in 0..4 {
                let y = 700.0 - paragraph as f32 * 160.0;
                page = page.text_at("F1", 10.0, 72.0, y, "Benchmark body text for pdfnote layout");
                for _ in 0..9 {
                    page = page.line("F1", 0.0, -12.0, "measurement across many lines of a page");
                }
            }
            page.with_annotation(AnnotationRecord {
                id: Some(format!("{} 0 R", i + 10)),
                quads: vec![Quad {
                    left: 60.0,
                    right: 400.0,
                    bottom: 697.0,
                    top: 711.0,
                }],
                contents: Some("Benchmark comment".to_string()),
                in_reply_to: None,
            })
        })
        .collect();
    MemorySource::from_pages(pages)
}

/// Benchmark PDF header sniffing.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj";
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| pdfnote::sniff_bytes(black_box(pdf_data)).unwrap());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| pdfnote::sniff_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark both passes at various document sizes.
fn bench_document_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_processing");

    for page_count in [1, 10, 50].iter() {
        let source = create_test_source(*page_count);
        let processor = DocumentProcessor::new(ParseOptions::default()).unwrap();

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| processor.render(black_box(&source), "bench").unwrap());
        });
    }

    group.finish();
}

/// Benchmark the statistics pass alone.
fn bench_statistics(c: &mut Criterion) {
    let source = create_test_source(50);
    let processor = DocumentProcessor::new(ParseOptions::default()).unwrap();

    c.bench_function("statistics_50_pages", |b| {
        b.iter(|| processor.statistics(black_box(&source), "bench").unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_document_processing,
    bench_statistics,
);
criterion_main!(benches);
