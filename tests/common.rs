// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Quiet tracing setup, client scopes and synthetic record builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::wildcard_in_or_patterns
)]
//! Shared test utilities for `googalytics`

use std::sync::{Arc, Once};

use chrono::NaiveDate;
use googalytics::providers::{RawQuery, SyntheticRecord, SyntheticTransport};
use googalytics::{AnalyticsSession, ClientScope, FetchConfig};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap()
}

pub const SC_DOMAIN: &str = "sc-domain:example.com";
pub const VIEW_ID: &str = "123456";
pub const GA4_PROPERTY: &str = "987654";

/// Scope with every provider configured
pub fn full_scope() -> ClientScope {
    ClientScope::default()
        .with_sc_domain(SC_DOMAIN)
        .with_view_id(VIEW_ID)
        .with_ga4_property_id(GA4_PROPERTY)
}

/// Scope with only Search Console configured
pub fn gsc_scope() -> ClientScope {
    ClientScope::default().with_sc_domain(SC_DOMAIN)
}

/// Session sharing `transport` so tests can inspect its call log
pub fn session(transport: &Arc<SyntheticTransport>, scope: ClientScope) -> AnalyticsSession {
    session_with_config(transport, scope, FetchConfig::default())
}

pub fn session_with_config(
    transport: &Arc<SyntheticTransport>,
    scope: ClientScope,
    config: FetchConfig,
) -> AnalyticsSession {
    init_test_logging();
    let raw: Arc<dyn RawQuery> = transport.clone();
    AnalyticsSession::new(raw, scope).with_config(config)
}

/// `count` Search Console rows with distinct queries over a few pages and days
pub fn gsc_records(count: usize) -> Vec<SyntheticRecord> {
    (0..count)
        .map(|i| {
            SyntheticRecord::new()
                .dimension("date", format!("2024-03-{:02}", i % 28 + 1))
                .dimension("country", if i % 2 == 0 { "usa" } else { "gbr" })
                .dimension("device", if i % 3 == 0 { "MOBILE" } else { "DESKTOP" })
                .dimension("page", format!("https://example.com/p/{}?ref={}", i % 5, i % 2))
                .dimension("query", format!("Running Shoes {i}"))
                .metric("clicks", (i % 7) as f64)
                .metric("impressions", (i * 10) as f64)
                .metric("ctr", 0.1)
                .metric("position", 3.5)
        })
        .collect()
}

/// Search Console rows carrying only a query and clicks
pub fn gsc_query_records(count: usize) -> Vec<SyntheticRecord> {
    (0..count)
        .map(|i| {
            SyntheticRecord::new()
                .dimension("query", format!("q{i}"))
                .metric("clicks", 1.0)
        })
        .collect()
}

/// GA3 metric names `ga:metric1` .. `ga:metricN`
pub fn ga3_metric_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("ga:metric{i}")).collect()
}

/// GA3 rows keyed by date and device carrying every named metric
pub fn ga3_records(rows: usize, metrics: &[String]) -> Vec<SyntheticRecord> {
    (0..rows)
        .map(|i| {
            let record = SyntheticRecord::new()
                .dimension("ga:date", format!("202403{:02}", i % 28 + 1))
                .dimension("ga:deviceCategory", if i % 2 == 0 { "mobile" } else { "desktop" });
            metrics
                .iter()
                .enumerate()
                .fold(record, |record, (m, name)| {
                    record.metric(name.as_str(), (i * 100 + m) as f64)
                })
        })
        .collect()
}

/// GA4 rows with landing pages and source / medium pairs
pub fn ga4_records() -> Vec<SyntheticRecord> {
    vec![
        SyntheticRecord::new()
            .dimension("date", "20240301")
            .dimension("landingPage", "/shoes?colour=red")
            .dimension("sessionSourceMedium", "google / organic")
            .metric("sessions", 10.0)
            .metric("totalUsers", 8.0)
            .metric("purchaseRevenue", 120.5),
        SyntheticRecord::new()
            .dimension("date", "20240301")
            .dimension("landingPage", "/socks")
            .dimension("sessionSourceMedium", "bing / organic")
            .metric("sessions", 4.0)
            .metric("totalUsers", 4.0)
            .metric("purchaseRevenue", 0.0),
        SyntheticRecord::new()
            .dimension("date", "20240302")
            .dimension("landingPage", "/shoes?colour=red")
            .dimension("sessionSourceMedium", "(direct)")
            .metric("sessions", 2.0)
            .metric("totalUsers", 2.0)
            .metric("purchaseRevenue", 45.0),
    ]
}
