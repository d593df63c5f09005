use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use leafscan::FeatureExtractor;

fn benchmark_feature_extraction(c: &mut Criterion) {
    let image = RgbImage::from_fn(256, 256, |x, y| {
        if (x / 32 + y / 32) % 2 == 0 {
            Rgb([40, 160, 50])
        } else {
            Rgb([150, 110, 30])
        }
    });
    let extractor = FeatureExtractor::new(42);

    c.bench_function("extract_features_256x256", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&image))))
    });
}

criterion_group!(benches, benchmark_feature_extraction);
criterion_main!(benches);
