//! Benchmarks for the grading pipeline.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use grade_color::hue_band::BandId;
use grade_color::opponent::{from_opponent, to_opponent};
use grade_color::{BandAdjuster, saturate};
use grade_core::ImageBuf;
use grade_ops::{CompositePipeline, GradeParams};

fn ramp(n: usize) -> Vec<[f32; 3]> {
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            [t * 1.2, (1.0 - t) * 0.8, (t * 7.0).fract()]
        })
        .collect()
}

fn gradient_image(size: u32) -> ImageBuf {
    let mut img = ImageBuf::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / size as f32;
            let v = y as f32 / size as f32;
            img.set_pixel(x, y, [u * 2.0, v, (u * v * 5.0).fract(), 1.0]);
        }
    }
    img
}

/// Opponent space conversions.
fn bench_opponent(c: &mut Criterion) {
    let mut group = c.benchmark_group("opponent");

    for size in [1000, 100000] {
        let values = ramp(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("roundtrip", size), &values, |b, v| {
            b.iter(|| v.iter().map(|&rgb| from_opponent(to_opponent(black_box(rgb)))).collect::<Vec<_>>())
        });
    }

    group.finish();
}

/// Per-pixel color operations.
fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");
    let values = ramp(10000);
    group.throughput(Throughput::Elements(10000));

    for perceptual in [0.0f32, 0.5, 1.0] {
        group.bench_with_input(BenchmarkId::new("saturate", perceptual), &perceptual, |b, &p| {
            b.iter(|| values.iter().map(|&rgb| saturate(black_box(rgb), 1.4, p)).collect::<Vec<_>>())
        });
    }

    let mut bands = BandAdjuster::default();
    bands.band_mut(BandId::Red).hue_adjust = 0.05;
    bands.band_mut(BandId::Blue).chroma_scale = 1.5;
    bands.perceptual = 0.5;
    group.bench_function("hue_correct", |b| {
        b.iter(|| values.iter().map(|&rgb| bands.apply(black_box(rgb))).collect::<Vec<_>>())
    });

    group.finish();
}

/// Full pipeline on square images.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    let mut color = GradeParams::default();
    color.pre.exposure.params.stops = 0.5;
    color.pre.contrast.params.total = 0.3;
    color.post.saturation.params.factor = 1.2;
    color.post.split_tone.params.shadow_saturation = 0.3;

    let mut everything = GradeParams::default();
    everything.set_all_enabled(true);
    everything.pre.glare.params.size = 8.0;
    everything.post.sharpness.params.amount = 0.5;
    everything.post.clarity.params.amount = 0.3;
    everything.post.film_grain.params.amount = 0.2;

    for size in [256u32, 512] {
        let img = gradient_image(size);
        group.throughput(Throughput::Elements(size as u64 * size as u64));

        for (name, params) in [("color", &color), ("all_stages", &everything)] {
            let pipeline = match CompositePipeline::new(params.clone()) {
                Ok(p) => p,
                Err(e) => panic!("bench parameters invalid: {e}"),
            };
            group.bench_with_input(BenchmarkId::new(name, size), &img, |b, img| {
                b.iter(|| pipeline.process(black_box(img), 1.0))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_opponent, bench_color, bench_pipeline);
criterion_main!(benches);
