use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use esmon_engine::{
    evaluate, MetricsBatch, NetCounters, RateDeriver, ResourceClassifier, SpikeFilter, Thresholds,
    NET_RECV,
};
use esmon_types::{Component, MetricDimension};

/// Benchmark one derive call per interface, steady state
fn bench_derive_interfaces(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_interfaces");

    for count in [1usize, 8, 64].iter() {
        let names: Vec<String> = (0..*count).map(|i| format!("eth{i}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            let mut deriver = RateDeriver::new();
            let start = Instant::now();
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                let now = start + Duration::from_secs(tick);
                for name in &names {
                    let reading = NetCounters {
                        bytes_recv: tick * 1_000,
                        bytes_sent: tick * 500,
                        ..Default::default()
                    };
                    black_box(deriver.derive(black_box(name), reading, now));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark spike filtering on a full window
fn bench_spike_filter(c: &mut Criterion) {
    let mut filter = SpikeFilter::default();
    let now = Instant::now();
    for value in [100.0, 110.0, 95.0, 105.0, 98.0, 102.0, 99.0, 101.0, 97.0, 103.0] {
        filter.smooth(NET_RECV, value, now);
    }

    c.bench_function("spike_filter_smooth", |b| {
        b.iter(|| black_box(filter.smooth(NET_RECV, black_box(104.0), now)));
    });
}

/// Benchmark interface classification
fn bench_classify(c: &mut Criterion) {
    let classifier = ResourceClassifier::network();
    let names = ["eth0", "lo", "veth3a9f21", "docker0", "enp0s31f6", "cali12345"];

    c.bench_function("classify_interfaces", |b| {
        b.iter(|| {
            for name in names {
                black_box(classifier.is_countable(black_box(name)));
            }
        });
    });
}

/// Benchmark threshold evaluation over a mid-sized cluster
fn bench_evaluate(c: &mut Criterion) {
    let thresholds = Thresholds::default();
    let mut batch = MetricsBatch::new(0);
    for node in 0..50 {
        let subject = Some(format!("data-{node}"));
        batch.push(
            Component::Node,
            MetricDimension::HeapPercent,
            subject.clone(),
            60.0 + (node % 30) as f64,
        );
        batch.push(
            Component::Node,
            MetricDimension::CpuPercent,
            subject,
            (node * 2) as f64,
        );
    }

    c.bench_function("evaluate_50_nodes", |b| {
        b.iter(|| black_box(evaluate(black_box(&batch), &thresholds)));
    });
}

criterion_group!(
    benches,
    bench_derive_interfaces,
    bench_spike_filter,
    bench_classify,
    bench_evaluate,
);
criterion_main!(benches);
