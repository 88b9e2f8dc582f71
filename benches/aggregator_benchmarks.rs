//! Benchmarks for the rolling metric windows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gait_metrics::{
    aggregator::{MetricBuffer, WindowedAggregator},
    constants::MAX_BUF,
    metrics::{Metric, MetricFrame},
};

fn benchmark_buffer_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric_buffer");

    // Test data - simulating noisy knee angles
    let test_data: Vec<f64> = (0..1000)
        .map(|i| 170.0 + 5.0 * (f64::from(i) * 0.1).sin() + rand::random::<f64>())
        .collect();

    for capacity in [30, MAX_BUF, 3000] {
        group.bench_with_input(BenchmarkId::new("push", capacity), &capacity, |b, &capacity| {
            let mut buffer = MetricBuffer::new(capacity);
            b.iter(|| {
                for &value in &test_data {
                    buffer.push(black_box(value));
                }
            });
        });
    }

    let mut full = MetricBuffer::new(MAX_BUF);
    for &value in &test_data {
        full.push(value);
    }
    group.bench_function("mean", |b| b.iter(|| black_box(full.mean())));
    group.bench_function("statistics", |b| b.iter(|| black_box(full.statistics())));

    group.finish();
}

fn benchmark_aggregator(c: &mut Criterion) {
    let frames: Vec<MetricFrame> = (0..1000)
        .map(|_| {
            let mut frame = MetricFrame::default();
            frame.set(Metric::ValgusLeft, Some(165.0 + 10.0 * rand::random::<f64>()));
            frame.set(Metric::ValgusRight, Some(165.0 + 10.0 * rand::random::<f64>()));
            frame.set(Metric::PelvicDrop, Some(5.0 * rand::random::<f64>()));
            frame.set(Metric::StepWidth, Some(rand::random::<f64>()));
            frame.set(Metric::TibialTilt, Some(10.0 * rand::random::<f64>()));
            frame
        })
        .collect();

    c.bench_function("aggregator_push_frame", |b| {
        let mut aggregator = WindowedAggregator::default();
        b.iter(|| {
            for frame in &frames {
                black_box(aggregator.push_frame(frame));
            }
        });
    });

    let mut aggregator = WindowedAggregator::default();
    for frame in &frames {
        aggregator.push_frame(frame);
    }
    c.bench_function("aggregator_snapshot", |b| b.iter(|| black_box(aggregator.snapshot())));
}

criterion_group!(benches, benchmark_buffer_push, benchmark_aggregator);
criterion_main!(benches);
