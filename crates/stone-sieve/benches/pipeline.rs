use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use stone_sieve::detect::extract_shapes;
use stone_sieve::{CalibrationTable, StoneDetector, StoneDetectorParams};

fn photo() -> RgbImage {
    let mut img = RgbImage::from_pixel(1280, 960, Rgb([230, 228, 220]));
    draw_filled_rect_mut(&mut img, Rect::at(40, 40).of_size(400, 280), Rgb([15, 15, 15]));
    for i in 0..6 {
        for j in 0..4 {
            let x = 500 + i * 120;
            let y = 80 + j * 200;
            let w = 30 + (i as u32 * 13 + j as u32 * 7) % 70;
            let h = 20 + (i as u32 * 5 + j as u32 * 11) % 60;
            draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), Rgb([110, 90, 70]));
        }
    }
    img
}

fn bench_pipeline(c: &mut Criterion) {
    let img = photo();
    let gray = image::imageops::grayscale(&img);
    let params = StoneDetectorParams::default();
    let detector = StoneDetector::new(params.clone(), CalibrationTable::legacy_sample1());

    c.bench_function("extract_shapes_1280x960", |b| {
        b.iter(|| extract_shapes(black_box(&gray), &params.edges))
    });
    c.bench_function("analyze_1280x960", |b| {
        b.iter(|| detector.analyze(black_box(&img), "S101.jpg"))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
