//! Grouping and sanitizing benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use lectern_core::annotate::ParagraphGrouper;
use lectern_core::pipeline::ContentSanitizer;
use lectern_core::AssetMap;
use std::hint::black_box;

fn chapter_markup(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Paragraph {} of a long chapter, with enough words to look like prose. \
                 <img src=\"../img/{}.jpg\"/></p>\n<!-- note -->",
                i,
                i % 7
            )
        })
        .collect()
}

fn grouping_benchmark(c: &mut Criterion) {
    let html = chapter_markup(400);
    let grouper = ParagraphGrouper::new(500, 10);

    c.bench_function("group_400_paragraphs", |b| {
        b.iter(|| grouper.group(black_box(&html)))
    });
}

fn sanitize_benchmark(c: &mut Criterion) {
    let raw = format!("<html><body>{}</body></html>", chapter_markup(400));
    let mut assets = AssetMap::new();
    for i in 0..7 {
        assets.insert(format!("{}.jpg", i), format!("images/{}.jpg", i));
    }
    let sanitizer = ContentSanitizer::new(&assets);

    c.bench_function("sanitize_400_paragraphs", |b| {
        b.iter(|| sanitizer.sanitize(black_box(&raw), "OEBPS/text/chapter.xhtml"))
    });
}

criterion_group!(benches, grouping_benchmark, sanitize_benchmark);
criterion_main!(benches);
