//! Annotation pipeline performance benchmarks.
//!
//! Measures single-sample annotation, batch annotation, and measurement
//! parsing on realistic messy records.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sample_annotator::{AnnotationReport, MeasurementEngine, Sample, SampleAnnotator, Value};

/// Generate records with the usual mix of aliases, spacing, and free-text units.
fn generate_samples(count: usize) -> Vec<Sample> {
    let temps = ["4 C", "12 degrees Celsius", "25°C", "18.5", "ambient"];
    let depths = ["0-10 cm", "5", "1.5 m", "10 +/- 2 cm", ""];
    let oxygen = ["aerobe", "Aerobic", "anaerobe", "facultative"];

    (0..count)
        .map(|i| {
            Sample::new()
                .with("id", format!("biosample:SAMN{:08}", i + 1))
                .with("env package", "soil")
                .with("checklist", "MIxS soil")
                .with("temperature", temps[i % temps.len()])
                .with("depth", depths[i % depths.len()])
                .with("rel_to_oxygen", oxygen[i % oxygen.len()])
                .with("lat_lon", format!("{:.4} {:.4}", 40.0 + (i % 50) as f64 * 0.01, -73.9))
                .with("favorite color", "teal")
        })
        .collect()
}

fn bench_single_sample(c: &mut Criterion) {
    let annotator = SampleAnnotator::bundled().expect("bundled schema loads");
    let sample = generate_samples(1).remove(0);

    c.bench_function("annotate_single_sample", |b| {
        b.iter(|| annotator.annotate(black_box(&sample)))
    });
}

fn bench_batch(c: &mut Criterion) {
    let annotator = SampleAnnotator::bundled().expect("bundled schema loads");
    let mut group = c.benchmark_group("annotate_all");

    for size in [10, 100, 1000] {
        let samples = generate_samples(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &samples, |b, samples| {
            b.iter(|| annotator.annotate_all(black_box(samples)))
        });
    }
    group.finish();
}

fn bench_measurement_repair(c: &mut Criterion) {
    let engine = MeasurementEngine::new();
    let inputs = [
        "2cm",
        "15 degrees Celsius at collection",
        "5 ± 0.5 m",
        "1.2 mg/L nitrate",
        "not measured",
    ];

    c.bench_function("measurement_repair", |b| {
        b.iter(|| {
            let mut report = AnnotationReport::new(Sample::new());
            for text in inputs {
                black_box(engine.repair(&Value::text(text), Some("meter"), &mut report));
            }
        })
    });
}

criterion_group!(benches, bench_single_sample, bench_batch, bench_measurement_repair);
criterion_main!(benches);
