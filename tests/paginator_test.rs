// ABOUTME: Tests for page-by-page fetching of one batch
// ABOUTME: Validates page size independence, row caps, truncation policy and error offsets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{
    day, full_scope, ga3_metric_names, ga3_records, ga4_records, gsc_query_records, gsc_records,
    gsc_scope, init_test_logging, session,
};
use futures_util::StreamExt;
use googalytics::paginator::{fetch_all, page_stream, PaginationConfig};
use googalytics::providers::synthetic::rate_limited;
use googalytics::providers::models::Batch;
use googalytics::providers::{
    Adapter, ProviderLimits, RawQuery, ReportingAdapter, SyntheticTransport,
};
use googalytics::{
    DateRange, FetchError, FetchRequest, ProviderKind, ReportKind, ReportQuery, TruncationPolicy,
};

fn adapter_for(provider: ProviderKind, transport: &Arc<SyntheticTransport>) -> Adapter {
    init_test_logging();
    let raw: Arc<dyn RawQuery> = transport.clone();
    Adapter::for_provider(provider, raw, &full_scope()).unwrap()
}

fn batch_for(provider: ProviderKind, dimensions: &[&str], metrics: &[String]) -> Batch {
    let request = FetchRequest::builder(provider)
        .scope(full_scope())
        .date_range(DateRange::new(day(2024, 3, 1), day(2024, 3, 28)).unwrap())
        .dimensions(dimensions.iter().copied())
        .metrics(metrics.iter().cloned())
        .build()
        .unwrap();
    request.batch(0, request.metrics().to_vec())
}

fn gsc_batch() -> Batch {
    let metrics: Vec<String> = ["clicks", "impressions"].map(str::to_owned).to_vec();
    batch_for(ProviderKind::Gsc, &["query", "page"], &metrics)
}

#[tokio::test]
async fn test_gsc_page_size_does_not_change_rows() {
    let transport = Arc::new(SyntheticTransport::new(gsc_records(57)));
    let adapter = adapter_for(ProviderKind::Gsc, &transport);
    let batch = gsc_batch();

    let reference = fetch_all(&adapter, &batch, PaginationConfig::new(25_000, adapter.limits()))
        .await
        .unwrap();
    assert_eq!(reference.len(), 57);

    for page_size in [1, 7, 25, 56, 57, 100] {
        let table = fetch_all(&adapter, &batch, PaginationConfig::new(page_size, adapter.limits()))
            .await
            .unwrap();
        assert_eq!(table.rows(), reference.rows(), "page size {page_size}");
        assert!(!table.metadata().truncated);
    }
}

#[tokio::test]
async fn test_ga3_token_pagination_matches_single_page() {
    let metrics = ga3_metric_names(2);
    let transport = Arc::new(SyntheticTransport::new(ga3_records(25, &metrics)));
    let adapter = adapter_for(ProviderKind::Ga3, &transport);
    let batch = batch_for(ProviderKind::Ga3, &["ga:date", "ga:deviceCategory"], &metrics);

    let whole = fetch_all(&adapter, &batch, PaginationConfig::new(1_000, adapter.limits()))
        .await
        .unwrap();
    let paged = fetch_all(&adapter, &batch, PaginationConfig::new(4, adapter.limits()))
        .await
        .unwrap();

    assert_eq!(whole.len(), 25);
    assert_eq!(paged.rows(), whole.rows());
    assert_eq!(paged.metadata().reported_row_count, Some(25));
}

#[tokio::test]
async fn test_ga4_short_page_ends_pagination() {
    let transport = Arc::new(SyntheticTransport::new(ga4_records()));
    let adapter = adapter_for(ProviderKind::Ga4, &transport);
    let metrics: Vec<String> = vec!["sessions".to_owned()];
    let batch = batch_for(ProviderKind::Ga4, &["date", "landingPage"], &metrics);

    let table = fetch_all(&adapter, &batch, PaginationConfig::new(2, adapter.limits()))
        .await
        .unwrap();

    // three distinct (date, landingPage) tuples: a full page of 2, then a short page of 1
    assert_eq!(table.len(), 3);
    assert_eq!(transport.call_count(), 2);
    assert_eq!(table.metadata().currency_code.as_deref(), Some("USD"));
    assert!(table.metadata().quota.is_some());
}

#[tokio::test]
async fn test_empty_first_page_keeps_raw_headers() {
    let transport = Arc::new(SyntheticTransport::new(Vec::new()));
    let adapter = adapter_for(ProviderKind::Gsc, &transport);
    let batch = gsc_batch();

    let table = fetch_all(&adapter, &batch, PaginationConfig::new(100, adapter.limits()))
        .await
        .unwrap();

    assert!(table.is_empty());
    assert_eq!(table.column_names(), vec!["query", "page", "clicks", "impressions"]);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_row_cap_truncates_and_flags() {
    let transport = Arc::new(SyntheticTransport::new(gsc_records(40)));
    let adapter = adapter_for(ProviderKind::Gsc, &transport);
    let config = PaginationConfig::new(15, adapter.limits()).with_row_cap(Some(20));

    let table = fetch_all(&adapter, &gsc_batch(), config).await.unwrap();

    assert_eq!(table.len(), 20);
    assert!(table.metadata().truncated);
    // 15 rows, then the 5 that remain under the cap
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_row_cap_with_error_policy_fails() {
    let transport = Arc::new(SyntheticTransport::new(gsc_records(40)));
    let adapter = adapter_for(ProviderKind::Gsc, &transport);
    let config = PaginationConfig::new(15, adapter.limits())
        .with_row_cap(Some(10))
        .with_truncation(TruncationPolicy::Error);

    let err = fetch_all(&adapter, &gsc_batch(), config).await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Truncated {
            provider: ProviderKind::Gsc,
            row_cap: 10
        }
    );
}

#[tokio::test]
async fn test_gsc_default_cap_is_one_hundred_thousand_rows() {
    let transport = Arc::new(SyntheticTransport::new(gsc_query_records(100_050)));
    let session = session(&transport, gsc_scope());
    let query = ReportQuery::new(ReportKind::GscQuery).start_date(day(2024, 3, 1));

    let table = session.get_df(query).await.unwrap();

    assert_eq!(table.len(), 100_000);
    assert!(table.metadata().truncated);
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test]
async fn test_page_failure_reports_row_offset() {
    let transport = Arc::new(
        SyntheticTransport::new(gsc_records(30)).fail_on_call(3, rate_limited(ProviderKind::Gsc)),
    );
    let adapter = adapter_for(ProviderKind::Gsc, &transport);

    let err = fetch_all(&adapter, &gsc_batch(), PaginationConfig::new(10, adapter.limits()))
        .await
        .unwrap_err();

    match err {
        FetchError::ProviderFetch {
            provider,
            batch,
            page_offset,
            source,
        } => {
            assert_eq!(provider, ProviderKind::Gsc);
            assert_eq!(batch, 0);
            assert_eq!(page_offset, 20);
            assert_eq!(source.status_code(), Some(429));
        }
        other => panic!("expected ProviderFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_page_stream_is_lazy() {
    let transport = Arc::new(SyntheticTransport::new(gsc_records(30)));
    let adapter = adapter_for(ProviderKind::Gsc, &transport);
    let batch = gsc_batch();
    let mut stream = page_stream(&adapter, &batch, PaginationConfig::new(10, adapter.limits()));

    let first = stream.next().await.unwrap().unwrap();

    assert_eq!(first.len(), 10);
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn test_page_size_clamped_to_provider_maximum() {
    let limits = ProviderLimits::for_provider(ProviderKind::Gsc);
    assert_eq!(PaginationConfig::new(1_000_000, limits).page_size, 25_000);
    assert_eq!(PaginationConfig::new(0, limits).page_size, 1);
    assert_eq!(PaginationConfig::new(0, limits).row_cap, Some(100_000));
}
