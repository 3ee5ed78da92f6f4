//! Benchmark for attribute extraction and classification
//!
//! Target: a full device (three smartctl outputs) well under 1ms

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use smart_disk_monitor::{AttributeExtractor, HealthClassifier};

const ATA_HDD_IDENTITY: &str = include_str!("../tests/fixtures/ata_hdd_identity.txt");
const ATA_HDD_ATTRIBUTES: &str = include_str!("../tests/fixtures/ata_hdd_attributes.txt");
const ATA_PASSED_HEALTH: &str = include_str!("../tests/fixtures/ata_passed_health.txt");
const NVME_IDENTITY: &str = include_str!("../tests/fixtures/nvme_identity.txt");
const NVME_HEALTH: &str = include_str!("../tests/fixtures/nvme_health.txt");
const NVME_ATTRIBUTES: &str = include_str!("../tests/fixtures/nvme_attributes.txt");

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("extract_ata_hdd", |b| {
        b.iter(|| {
            AttributeExtractor::extract(
                black_box(ATA_HDD_IDENTITY),
                black_box(ATA_PASSED_HEALTH),
                black_box(ATA_HDD_ATTRIBUTES),
            )
        });
    });

    group.bench_function("extract_nvme", |b| {
        b.iter(|| {
            AttributeExtractor::extract(
                black_box(NVME_IDENTITY),
                black_box(NVME_HEALTH),
                black_box(NVME_ATTRIBUTES),
            )
        });
    });

    group.bench_function("extract_empty", |b| {
        b.iter(|| AttributeExtractor::extract(black_box(""), black_box(""), black_box("")));
    });

    group.finish();
}

fn bench_extract_and_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    group.throughput(Throughput::Elements(1));

    let classifier = HealthClassifier::new();

    group.bench_function("extract_and_classify_hdd", |b| {
        b.iter(|| {
            let record = AttributeExtractor::extract(
                black_box(ATA_HDD_IDENTITY),
                black_box(ATA_PASSED_HEALTH),
                black_box(ATA_HDD_ATTRIBUTES),
            );
            classifier.classify("/dev/sda", &record)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_extract_and_classify);
criterion_main!(benches);
