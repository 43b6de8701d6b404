// ABOUTME: Tests for environment-driven fetch and logging configuration
// ABOUTME: Defaults, overrides, clamping and fallback on unparseable values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use googalytics::logging::LogFormat;
use googalytics::providers::constants::{env_config, limits};
use googalytics::{FetchConfig, LoggingConfig, ProviderKind, TruncationPolicy};
use serial_test::serial;

const FETCH_VARS: &[&str] = &[
    env_config::MAX_METRICS_PER_CALL,
    env_config::GSC_PAGE_SIZE,
    env_config::GA3_PAGE_SIZE,
    env_config::GA4_PAGE_SIZE,
    env_config::ROW_LIMIT,
    env_config::TRUNCATION,
    env_config::CONCURRENT_BATCHES,
    env_config::HTTP_TIMEOUT_SECS,
    env_config::HTTP_CONNECT_TIMEOUT_SECS,
    env_config::RETRY_MAX_ATTEMPTS,
    env_config::RETRY_INITIAL_BACKOFF_MS,
];

const LOGGING_VARS: &[&str] = &["RUST_LOG", "LOG_FORMAT", "LOG_INCLUDE_LOCATION", "SERVICE_NAME"];

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_fetch_config_defaults() {
    clear(FETCH_VARS);

    let config = FetchConfig::from_env();

    assert_eq!(config, FetchConfig::default());
    assert_eq!(config.max_metrics_per_call, 10);
    assert_eq!(config.page_size(ProviderKind::Gsc), limits::GSC_MAX_PAGE_SIZE);
    assert_eq!(config.page_size(ProviderKind::Ga3), limits::GA3_MAX_PAGE_SIZE);
    assert_eq!(config.page_size(ProviderKind::Ga4), limits::GA4_MAX_PAGE_SIZE);
    assert_eq!(config.row_limit, None);
    assert_eq!(config.truncation, TruncationPolicy::Allow);
    assert!(!config.concurrent_batches);
}

#[test]
#[serial]
fn test_fetch_config_overrides() {
    clear(FETCH_VARS);
    env::set_var(env_config::GSC_PAGE_SIZE, "500");
    env::set_var(env_config::ROW_LIMIT, "2000");
    env::set_var(env_config::TRUNCATION, "Error");
    env::set_var(env_config::CONCURRENT_BATCHES, "true");
    env::set_var(env_config::HTTP_TIMEOUT_SECS, "5");
    env::set_var(env_config::RETRY_MAX_ATTEMPTS, "7");

    let config = FetchConfig::from_env();
    clear(FETCH_VARS);

    assert_eq!(config.gsc_page_size, 500);
    assert_eq!(config.row_limit, Some(2000));
    assert_eq!(config.truncation, TruncationPolicy::Error);
    assert!(config.concurrent_batches);
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.retry.initial_backoff_ms, 1000);
}

#[test]
#[serial]
fn test_metrics_per_call_is_clamped_to_api_maximum() {
    clear(FETCH_VARS);
    env::set_var(env_config::MAX_METRICS_PER_CALL, "25");
    let high = FetchConfig::from_env();
    env::set_var(env_config::MAX_METRICS_PER_CALL, "0");
    let low = FetchConfig::from_env();
    clear(FETCH_VARS);

    assert_eq!(high.max_metrics_per_call, limits::MAX_METRICS_PER_CALL);
    assert_eq!(low.max_metrics_per_call, 1);
}

#[test]
#[serial]
fn test_unparseable_values_fall_back_to_defaults() {
    clear(FETCH_VARS);
    env::set_var(env_config::GA4_PAGE_SIZE, "lots");
    env::set_var(env_config::ROW_LIMIT, "0");
    env::set_var(env_config::TRUNCATION, "sometimes");
    env::set_var(env_config::CONCURRENT_BATCHES, "yes please");

    let config = FetchConfig::from_env();
    clear(FETCH_VARS);

    assert_eq!(config.ga4_page_size, limits::GA4_MAX_PAGE_SIZE);
    assert_eq!(config.row_limit, None);
    assert_eq!(config.truncation, TruncationPolicy::Allow);
    assert!(!config.concurrent_batches);
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    clear(LOGGING_VARS);
    let defaults = LoggingConfig::from_env();
    assert_eq!(defaults, LoggingConfig::default());

    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_INCLUDE_LOCATION", "1");
    env::set_var("SERVICE_NAME", "seo-reports");
    let config = LoggingConfig::from_env();
    clear(LOGGING_VARS);

    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.include_location);
    assert_eq!(config.service_name, "seo-reports");
}

#[test]
#[serial]
fn test_log_location_disabled_by_false() {
    clear(LOGGING_VARS);
    env::set_var("LOG_INCLUDE_LOCATION", "false");
    env::set_var("LOG_FORMAT", "compact");
    let config = LoggingConfig::from_env();
    clear(LOGGING_VARS);

    assert!(!config.include_location);
    assert_eq!(config.format, LogFormat::Compact);
}
