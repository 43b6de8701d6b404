// ABOUTME: Criterion benchmarks for joining metric batch tables and full batched fetches
// ABOUTME: Measures outer-join cost by row count and end-to-end fetch over the synthetic transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Criterion benchmarks for batch merging.
//!
//! A request with more metrics than one call accepts is fetched in batches
//! whose tables are outer-joined on their dimensions. These benchmarks cover
//! the join alone and the whole fetch pipeline.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use googalytics::partitioner::merge;
use googalytics::providers::{RawQuery, SyntheticRecord, SyntheticTransport};
use googalytics::{
    AnalyticsSession, ClientScope, Column, DateRange, FetchRequest, ProviderKind, ResultTable,
    Value,
};
use tokio::runtime::Runtime;

const ROW_COUNTS: [usize; 3] = [100, 1_000, 10_000];

/// Table keyed by (date, page) holding one metric, keys starting at `offset`
fn batch_table(rows: usize, metric: &str, offset: usize) -> ResultTable {
    let columns = vec![
        Column::dimension("record_date"),
        Column::dimension("landing_page"),
        Column::metric(metric),
    ];
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows = (offset..rows + offset)
        .map(|i| {
            vec![
                Value::Date(base + Days::new((i % 365) as u64)),
                Value::text(format!("/page/{}", i / 365)),
                Value::Float(i as f64),
            ]
        })
        .collect();
    ResultTable::from_rows(columns, rows).unwrap()
}

fn bench_outer_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("outer_join");

    for rows in ROW_COUNTS {
        let left = batch_table(rows, "sessions", 0);
        let right = batch_table(rows, "users", rows / 2);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(
            BenchmarkId::new("half_overlap", rows),
            &(left, right),
            |b, (left, right)| {
                b.iter(|| black_box(left).outer_join(black_box(right)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_merge_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for rows in ROW_COUNTS {
        let tables: Vec<ResultTable> = (0..3)
            .map(|i| batch_table(rows, &format!("metric{i}"), i * rows / 4))
            .collect();

        group.throughput(Throughput::Elements((rows * tables.len()) as u64));
        group.bench_with_input(BenchmarkId::new("three_batches", rows), &tables, |b, tables| {
            b.iter(|| merge(black_box(tables.clone())).unwrap());
        });
    }

    group.finish();
}

fn ga3_records(rows: usize, metrics: &[String]) -> Vec<SyntheticRecord> {
    (0..rows)
        .map(|i| {
            let record = SyntheticRecord::new()
                .dimension("ga:date", format!("202403{:02}", i % 28 + 1))
                .dimension("ga:landingPagePath", format!("/page/{}", i / 28));
            metrics
                .iter()
                .fold(record, |record, metric| record.metric(metric.as_str(), i as f64))
        })
        .collect()
}

fn bench_batched_fetch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("batched_fetch");
    group.sample_size(20);

    let metrics: Vec<String> = (1..=25).map(|i| format!("ga:metric{i}")).collect();
    let scope = ClientScope::default().with_view_id("123456");
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let request = FetchRequest::builder(ProviderKind::Ga3)
        .scope(scope.clone())
        .date_range(DateRange::single(day))
        .dimensions(["ga:date", "ga:landingPagePath"])
        .metrics(metrics.iter().cloned())
        .build()
        .unwrap();

    for rows in [100, 1_000] {
        let transport: Arc<dyn RawQuery> =
            Arc::new(SyntheticTransport::new(ga3_records(rows, &metrics)));
        let session = AnalyticsSession::new(transport, scope.clone());

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("ga3_25_metrics", rows), &request, |b, request| {
            b.iter(|| rt.block_on(async { session.fetch(black_box(request)).await.unwrap() }));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_outer_join,
    bench_merge_batches,
    bench_batched_fetch
);
criterion_main!(benches);
