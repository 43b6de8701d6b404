// ABOUTME: Tests for URL inspection reports
// ABOUTME: One call and one row per URL, empty results and error propagation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{gsc_scope, session};
use googalytics::providers::synthetic::rate_limited;
use googalytics::providers::{SyntheticTransport, INSPECTION_COLUMNS};
use googalytics::{FetchError, ProviderError, ProviderKind, ReportKind, ReportQuery, Value};
use serde_json::json;

const SHOES: &str = "https://example.com/shoes";
const SOCKS: &str = "https://example.com/socks";

fn inspect(urls: &[&str]) -> ReportQuery {
    ReportQuery::new(ReportKind::Url).url_list(urls.iter().copied())
}

#[tokio::test]
async fn test_one_row_per_url() {
    let transport = Arc::new(SyntheticTransport::new(Vec::new()));
    let session = session(&transport, gsc_scope());

    let table = session.get_df(inspect(&[SHOES, SOCKS])).await.unwrap();

    assert_eq!(transport.call_count(), 2);
    assert_eq!(table.column_names(), INSPECTION_COLUMNS.to_vec());
    assert!(table.metrics().is_empty());
    assert_eq!(table.len(), 2);
    assert_eq!(table.value(0, "url"), Some(&Value::text(SHOES)));
    assert_eq!(table.value(1, "url"), Some(&Value::text(SOCKS)));
    assert_eq!(table.value(0, "response"), Some(&Value::text("success")));
    assert_eq!(
        table.value(0, "index_status_result_verdict"),
        Some(&Value::text("PASS"))
    );
    assert_eq!(table.value(1, "google_canonical"), Some(&Value::text(SOCKS)));
    assert!(matches!(table.value(0, "record_date"), Some(Value::Date(_))));
    assert!(matches!(table.value(0, "last_crawl_time"), Some(Value::Timestamp(_))));
}

#[tokio::test]
async fn test_inspection_lists_and_missing_results() {
    let transport = Arc::new(
        SyntheticTransport::new(Vec::new())
            .with_inspection(
                SHOES,
                json!({
                    "inspectionResult": {
                        "indexStatusResult": {
                            "verdict": "NEUTRAL",
                            "coverageState": "Discovered - currently not indexed",
                            "sitemap": ["https://example.com/sitemap.xml"],
                            "referringUrls": ["https://example.com/", "https://example.com/sale"],
                        }
                    }
                }),
            )
            .with_inspection(SOCKS, json!({})),
    );
    let session = session(&transport, gsc_scope());

    let table = session.get_df(inspect(&[SHOES, SOCKS])).await.unwrap();

    assert_eq!(
        table.value(0, "sitemap"),
        Some(&Value::List(vec!["https://example.com/sitemap.xml".to_owned()]))
    );
    assert_eq!(
        table.value(0, "referring_urls"),
        Some(&Value::List(vec![
            "https://example.com/".to_owned(),
            "https://example.com/sale".to_owned()
        ]))
    );
    assert_eq!(table.value(0, "last_crawl_time"), Some(&Value::Null));
    assert_eq!(table.value(1, "response"), Some(&Value::text("empty")));
    assert_eq!(table.value(1, "coverage_state"), Some(&Value::Null));
}

#[tokio::test]
async fn test_inspection_failure_fails_the_report() {
    let transport = Arc::new(
        SyntheticTransport::new(Vec::new())
            .fail_on_call(2, rate_limited(ProviderKind::UrlInspection)),
    );
    let session = session(&transport, gsc_scope());

    let err = session
        .get_df(inspect(&[SHOES, SOCKS, "https://example.com/hats"]))
        .await
        .unwrap_err();

    let source = err.provider_error().unwrap();
    assert!(matches!(source, ProviderError::RateLimitExceeded { .. }));
    assert!(matches!(
        err,
        FetchError::ProviderFetch {
            provider: ProviderKind::UrlInspection,
            ..
        }
    ));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_blank_url_rejected() {
    let transport = Arc::new(SyntheticTransport::new(Vec::new()));
    let session = session(&transport, gsc_scope());

    let err = session.get_df(inspect(&[SHOES, "  "])).await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidRequest { .. }));
    assert_eq!(transport.call_count(), 0);
}
