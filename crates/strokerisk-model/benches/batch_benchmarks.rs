//! Batch scoring benchmarks
//!
//! Compares one batched model call against scoring the same items one at a
//! time, over the bundled stroke pipeline.
//!
//! Run with: cargo bench -p strokerisk-model

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use strokerisk_core::{BatchRequest, FlagInput, PredictionRequest};
use strokerisk_model::{ArtifactFormat, FittedPipeline, PredictionService};

const ARTIFACT: &str = include_str!("../../../models/stroke_best_pipeline.json");

fn service() -> PredictionService {
    let spec = ArtifactFormat::Json
        .parse(ARTIFACT)
        .expect("Failed to parse bundled artifact");
    let pipeline = FittedPipeline::from_spec(spec).expect("Failed to build pipeline");
    PredictionService::new(Arc::new(pipeline))
}

fn patients(n: usize) -> Vec<PredictionRequest> {
    let work_types = ["Private", "Govt_job", "Self-employed", "children"];
    (0..n)
        .map(|i| PredictionRequest {
            gender: if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
            age: (i % 90) as f64 + 0.5,
            hypertension: FlagInput::Int((i % 3 == 0) as i64),
            heart_disease: FlagInput::Bool(i % 7 == 0),
            ever_married: if i % 4 == 0 { "No" } else { "Yes" }.to_string(),
            work_type: work_types[i % work_types.len()].to_string(),
            residence_type: if i % 2 == 0 { "Urban" } else { "Rural" }.to_string(),
            avg_glucose_level: 70.0 + (i % 150) as f64,
            bmi: 18.0 + (i % 25) as f64,
            smoking_status: (i % 5 != 0).then(|| "never smoked".to_string()),
            threshold: 0.3,
        })
        .collect()
}

/// One model call for the whole batch
fn benchmark_batched(c: &mut Criterion) {
    let service = service();

    let mut group = c.benchmark_group("Batch_Scoring");
    group.sample_size(50);

    for size in [1usize, 16, 256, 4096] {
        let batch = BatchRequest::new(patients(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("predict_batch", size), &batch, |b, batch| {
            b.iter(|| service.predict_batch(black_box(batch)).unwrap())
        });
    }

    group.finish();
}

/// One model call per item, for comparison
fn benchmark_per_item(c: &mut Criterion) {
    let service = service();

    let mut group = c.benchmark_group("Per_Item_Scoring");
    group.sample_size(50);

    for size in [1usize, 16, 256] {
        let items = patients(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("predict_one", size), &items, |b, items| {
            b.iter(|| {
                items
                    .iter()
                    .map(|item| service.predict_one(black_box(item)).unwrap())
                    .collect::<Vec<_>>()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_batched, benchmark_per_item);
criterion_main!(benches);
