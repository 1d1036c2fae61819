//! Decoder latency benchmarks
//!
//! The decoder is the only pure-Rust hot-path stage (argmax + softmax +
//! label lookup); this verifies it stays negligible next to the forward
//! pass even at large class counts.
//!
//! Run with: cargo bench -p textguard-inference

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use textguard_inference::{decode, LabelMap, ModelOutput};

fn synthetic_output(num_labels: usize) -> ModelOutput {
    // Deterministic spread of logits with a single clear peak.
    let row: Vec<f32> = (0..num_labels)
        .map(|i| ((i * 37) % 101) as f32 / 10.0)
        .collect();
    ModelOutput { logits: vec![row] }
}

fn full_label_map(num_labels: usize) -> LabelMap {
    LabelMap::from_entries((0..num_labels).map(|i| (i, format!("label_{}", i))))
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");
    group.sample_size(100);

    // 2 is binary sentiment; 393 matches a large topic taxonomy.
    for num_labels in [2usize, 16, 393] {
        let output = synthetic_output(num_labels);
        let labels = full_label_map(num_labels);

        group.bench_with_input(
            BenchmarkId::new("decode", num_labels),
            &num_labels,
            |b, _| {
                b.iter(|| decode(black_box(&output), black_box(&labels)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_decode);
criterion_main!(benches);
