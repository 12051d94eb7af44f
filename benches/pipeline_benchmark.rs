//! Benchmarks for docweave reconstruction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic layout dumps and table detections.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docweave::geometry::Rect;
use docweave::model::{DetectedRegion, ExtractedContent, ImageSize, LayoutBlock, RegionKind};
use docweave::{DocumentBuilder, PageInput};

/// Creates a synthetic page of alternating headings, paragraphs and math.
fn create_test_page(block_count: usize) -> PageInput {
    let mut page = PageInput::default();
    let step = 0.8 / block_count as f32;

    for i in 0..block_count {
        let y0 = 0.1 + i as f32 * step;
        let bbox = Rect::new(0.1, y0, 0.9, y0 + step * 0.8);
        match i % 6 {
            0 => page.push(
                LayoutBlock::text(bbox).with_label("Section-header"),
                ExtractedContent::Text(format!("{} Section Heading", i / 6 + 1)),
            ),
            4 => page.push(
                LayoutBlock::new(docweave::BlockType::Math, bbox),
                ExtractedContent::Latex("a^2 + b^2 = c^2".to_string()),
            ),
            _ => page.push(
                LayoutBlock::text(bbox),
                ExtractedContent::Text(
                    "Benchmark content line for docweave paragraph assembly and".to_string(),
                ),
            ),
        }
    }
    page
}

/// Creates detections for a grid with one spanning header cell.
fn create_test_grid(rows: usize, cols: usize) -> Vec<DetectedRegion> {
    let width = cols as f32 * 80.0;
    let height = rows as f32 * 20.0;
    let mut detections = vec![DetectedRegion::new(
        RegionKind::Table,
        Rect::new(0.0, 0.0, width, height),
        0.95,
    )];

    for r in 0..rows {
        let y0 = r as f32 * 20.0;
        detections.push(DetectedRegion::new(
            RegionKind::Row,
            Rect::new(0.0, y0, width, y0 + 20.0),
            0.9,
        ));
    }
    for c in 0..cols {
        let x0 = c as f32 * 80.0;
        detections.push(DetectedRegion::new(
            RegionKind::Column,
            Rect::new(x0, 0.0, x0 + 80.0, height),
            0.9,
        ));
    }
    detections.push(DetectedRegion::new(
        RegionKind::SpanningCell,
        Rect::new(0.0, 0.0, 160.0, 20.0),
        0.5,
    ));
    detections
}

/// Benchmark single-page assembly and refinement.
fn bench_page_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_assembly");
    let processor = docweave::PageProcessor::new().unwrap();

    for block_count in [10, 50, 200].iter() {
        let page = create_test_page(*block_count);

        group.bench_function(format!("{}_blocks", block_count), |b| {
            b.iter(|| processor.process(0, black_box(&page)));
        });
    }

    group.finish();
}

/// Benchmark whole-document builds, parallel against sequential.
fn bench_document_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_build");
    let pages: Vec<PageInput> = (0..20).map(|_| create_test_page(50)).collect();

    let parallel = DocumentBuilder::new().unwrap();
    group.bench_function("parallel_20_pages", |b| {
        b.iter(|| parallel.build(black_box(&pages)));
    });

    let sequential = DocumentBuilder::new().unwrap().with_parallel(false);
    group.bench_function("sequential_20_pages", |b| {
        b.iter(|| sequential.build(black_box(&pages)));
    });

    group.finish();
}

/// Benchmark grid reconstruction at various table sizes.
fn bench_grid_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_reconstruction");
    let grid = docweave::table::GridReconstructor::new();

    for (rows, cols) in [(4, 3), (12, 6), (40, 10)].iter() {
        let detections = create_test_grid(*rows, *cols);
        let image = ImageSize::new(*cols as u32 * 80 + 40, *rows as u32 * 20 + 40);

        group.bench_function(format!("{}x{}", rows, cols), |b| {
            b.iter(|| grid.reconstruct(black_box(&detections), image));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_page_assembly,
    bench_document_build,
    bench_grid_reconstruction,
);
criterion_main!(benches);
