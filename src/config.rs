// ABOUTME: Environment-driven fetch configuration with defaults from the provider limits
// ABOUTME: Page sizes, row caps, batch concurrency, HTTP timeouts and 429 retry settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::env;
use std::str::FromStr;

use googalytics_core::constants::{env_config, limits};
use googalytics_core::{ProviderKind, TruncationPolicy};
use googalytics_providers::{HttpClientConfig, RetryConfig};
use tracing::warn;

/// Pipeline configuration shared by every fetch of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Metrics per GA request, never above the API maximum
    pub max_metrics_per_call: usize,
    /// Search Console rows per page
    pub gsc_page_size: usize,
    /// GA3 rows per page
    pub ga3_page_size: usize,
    /// GA4 rows per page
    pub ga4_page_size: usize,
    /// Row cap per batch overriding the provider default
    pub row_limit: Option<usize>,
    /// Behaviour at the row cap when the request does not choose
    pub truncation: TruncationPolicy,
    /// Fetch metric batches concurrently when the request does not choose
    pub concurrent_batches: bool,
    /// Shared HTTP client timeouts
    pub http: HttpClientConfig,
    /// HTTP 429 retry policy
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_metrics_per_call: limits::MAX_METRICS_PER_CALL,
            gsc_page_size: limits::GSC_MAX_PAGE_SIZE,
            ga3_page_size: limits::GA3_MAX_PAGE_SIZE,
            ga4_page_size: limits::GA4_MAX_PAGE_SIZE,
            row_limit: None,
            truncation: TruncationPolicy::Allow,
            concurrent_batches: false,
            http: HttpClientConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Load configuration from `GOOGALYTICS_*` environment variables
    ///
    /// Unset or unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_metrics_per_call: parse_or(
                env_config::MAX_METRICS_PER_CALL,
                defaults.max_metrics_per_call,
            )
            .clamp(1, limits::MAX_METRICS_PER_CALL),
            gsc_page_size: parse_or(env_config::GSC_PAGE_SIZE, defaults.gsc_page_size),
            ga3_page_size: parse_or(env_config::GA3_PAGE_SIZE, defaults.ga3_page_size),
            ga4_page_size: parse_or(env_config::GA4_PAGE_SIZE, defaults.ga4_page_size),
            row_limit: env::var(env_config::ROW_LIMIT)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|limit| *limit > 0),
            truncation: parse_truncation(&env_var_or(env_config::TRUNCATION, "allow")),
            concurrent_batches: parse_or(env_config::CONCURRENT_BATCHES, false),
            http: HttpClientConfig {
                timeout_secs: parse_or(env_config::HTTP_TIMEOUT_SECS, defaults.http.timeout_secs),
                connect_timeout_secs: parse_or(
                    env_config::HTTP_CONNECT_TIMEOUT_SECS,
                    defaults.http.connect_timeout_secs,
                ),
            },
            retry: RetryConfig {
                max_retries: parse_or(env_config::RETRY_MAX_ATTEMPTS, defaults.retry.max_retries),
                initial_backoff_ms: parse_or(
                    env_config::RETRY_INITIAL_BACKOFF_MS,
                    defaults.retry.initial_backoff_ms,
                ),
                ..defaults.retry
            },
        }
    }

    /// Configured page size for `provider`
    ///
    /// URL inspection pages are the URL count of one round of inspections.
    #[must_use]
    pub const fn page_size(&self, provider: ProviderKind) -> usize {
        match provider {
            ProviderKind::Gsc => self.gsc_page_size,
            ProviderKind::Ga3 => self.ga3_page_size,
            ProviderKind::Ga4 => self.ga4_page_size,
            ProviderKind::UrlInspection => usize::MAX,
        }
    }
}

fn parse_truncation(value: &str) -> TruncationPolicy {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => TruncationPolicy::Error,
        "allow" => TruncationPolicy::Allow,
        other => {
            warn!(value = other, "Unknown truncation policy, using allow");
            TruncationPolicy::Allow
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
