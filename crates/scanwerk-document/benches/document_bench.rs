// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanwerk-document crate: the full scan pipeline
// on a synthetic photo, and the page cleaner on its own.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

use scanwerk_core::ScanConfig;
use scanwerk_document::ScanPipeline;
use scanwerk_document::scan::clean_page;

/// A 640x480 dark frame holding a tilted light page with ruled "text".
fn synthetic_photo() -> DynamicImage {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([25, 30, 35]));
    let page = [
        Point::new(140, 50),
        Point::new(540, 80),
        Point::new(510, 430),
        Point::new(100, 400),
    ];
    draw_polygon_mut(&mut img, &page, Rgb([235, 235, 230]));
    for row in 0..10 {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(180, 110 + row * 28).of_size(280, 6),
            Rgb([20, 20, 20]),
        );
    }
    DynamicImage::ImageRgb8(img)
}

fn bench_scan_pipeline(c: &mut Criterion) {
    let photo = synthetic_photo();
    let pipeline = ScanPipeline::default();

    c.bench_function("scan_pipeline (640x480)", |b| {
        b.iter(|| {
            let outcome = pipeline.process(black_box(&photo));
            black_box(outcome.image);
        });
    });
}

fn bench_clean_page(c: &mut Criterion) {
    let photo = synthetic_photo();
    let config = ScanConfig::default();

    c.bench_function("clean_page (640x480)", |b| {
        b.iter(|| black_box(clean_page(black_box(&photo), &config)));
    });
}

criterion_group!(benches, bench_scan_pipeline, bench_clean_page);
criterion_main!(benches);
