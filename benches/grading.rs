use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use produce_grading::{
    analyze_detections, AnalysisSettings, BoundingBox, Detection, HsvImage, QualityGrader,
};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 60])
    })
}

fn benchmark_grading(c: &mut Criterion) {
    let grader = QualityGrader::new();
    let region = gradient(128, 128);

    c.bench_function("hsv_conversion_128", |b| {
        b.iter(|| HsvImage::from_rgb(black_box(&region)))
    });

    c.bench_function("classify_quality_128", |b| {
        b.iter(|| grader.classify_quality(black_box(&region), "apple"))
    });

    c.bench_function("quality_score_128", |b| {
        b.iter(|| grader.calculate_quality_score(black_box(&region)))
    });

    let frame = gradient(1024, 768);
    let detections: Vec<Detection> = (0..32)
        .map(|i| {
            let x = (i % 8) as f64 * 120.0;
            let y = (i / 8) as f64 * 180.0;
            Detection::new("orange", 0.9, BoundingBox::new(x, y, x + 100.0, y + 100.0))
        })
        .collect();
    let settings = AnalysisSettings::default();

    c.bench_function("analyze_detections_32", |b| {
        b.iter(|| analyze_detections(&grader, black_box(&frame), &detections, &settings))
    });
}

criterion_group!(benches, benchmark_grading);
criterion_main!(benches);
