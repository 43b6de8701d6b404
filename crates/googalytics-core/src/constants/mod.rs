// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Provider limits, default field lists, endpoints and environment variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single flat list.

/// ISO-3166 country code table
pub mod countries;

/// Hard limits imposed by the reporting APIs
pub mod limits {
    /// Maximum metrics a single GA3 or GA4 report may request
    pub const MAX_METRICS_PER_CALL: usize = 10;
    /// Metrics Search Console always returns together
    pub const GSC_METRIC_COUNT: usize = 4;
    /// Maximum `rowLimit` for Search Console search analytics
    pub const GSC_MAX_PAGE_SIZE: usize = 25_000;
    /// Maximum `pageSize` for GA3 reporting v4
    pub const GA3_MAX_PAGE_SIZE: usize = 100_000;
    /// Maximum `limit` for the GA4 data API
    pub const GA4_MAX_PAGE_SIZE: usize = 250_000;
    /// Row cap applied when the caller does not set one
    pub const DEFAULT_ROW_LIMIT: usize = 100_000;
    /// Maximum dimensions per GA3 report
    pub const GA3_MAX_DIMENSIONS: usize = 7;
    /// Maximum dimensions per GA4 report
    pub const GA4_MAX_DIMENSIONS: usize = 9;
}

/// Default request shapes per provider
pub mod defaults {
    /// Days Search Console data lags behind today
    pub const GSC_LAG_DAYS: i64 = 3;
    /// Look-back window when listing available Search Console dates
    pub const GSC_AVAILABLE_DATES_DAYS: i64 = 500;
    /// Look-back window when listing available Analytics dates
    pub const GA_AVAILABLE_DATES_DAYS: i64 = 1500;
    /// Window used by the API status probe
    pub const API_STATUS_DAYS: i64 = 7;

    /// Search Console default dimensions
    pub const GSC_DIMENSIONS: &[&str] = &["date", "country", "device", "page", "query"];
    /// Search Console metrics; the API always returns all four
    pub const GSC_METRICS: &[&str] = &["clicks", "impressions", "ctr", "position"];
    /// Dimensions for query-only Search Console reports
    pub const GSC_QUERY_DIMENSIONS: &[&str] = &["query"];
    /// Every dimension Search Console accepts
    pub const GSC_VALID_DIMENSIONS: &[&str] =
        &["date", "country", "device", "page", "query", "searchAppearance"];

    /// GA3 default dimensions
    pub const GA3_DIMENSIONS: &[&str] = &[
        "ga:date",
        "ga:landingPagePath",
        "ga:productName",
        "ga:source",
        "ga:medium",
    ];
    /// GA3 default metrics
    pub const GA3_METRICS: &[&str] = &[
        "ga:itemRevenue",
        "ga:itemQuantity",
        "ga:users",
        "ga:newUsers",
        "ga:sessions",
        "ga:sessionDuration",
    ];

    /// GA4 default dimensions
    pub const GA4_DIMENSIONS: &[&str] = &["date", "landingPage", "sessionSourceMedium"];
    /// GA4 default metrics
    pub const GA4_METRICS: &[&str] = &["sessions", "totalUsers", "purchaseRevenue"];
}

/// Reporting API endpoints
pub mod endpoints {
    /// Search Console API root
    pub const SEARCH_CONSOLE_BASE: &str = "https://searchconsole.googleapis.com";
    /// GA3 reporting v4 API root
    pub const ANALYTICS_REPORTING_BASE: &str = "https://analyticsreporting.googleapis.com";
    /// GA4 data API root
    pub const ANALYTICS_DATA_BASE: &str = "https://analyticsdata.googleapis.com";
}

/// Environment variable names read by `FetchConfig::from_env`
pub mod env_config {
    /// Metrics per GA request (capped at the API maximum)
    pub const MAX_METRICS_PER_CALL: &str = "GOOGALYTICS_MAX_METRICS_PER_CALL";
    /// Search Console page size
    pub const GSC_PAGE_SIZE: &str = "GOOGALYTICS_GSC_PAGE_SIZE";
    /// GA3 page size
    pub const GA3_PAGE_SIZE: &str = "GOOGALYTICS_GA3_PAGE_SIZE";
    /// GA4 page size
    pub const GA4_PAGE_SIZE: &str = "GOOGALYTICS_GA4_PAGE_SIZE";
    /// Row cap per batch
    pub const ROW_LIMIT: &str = "GOOGALYTICS_ROW_LIMIT";
    /// `allow` or `error` when the row cap is reached
    pub const TRUNCATION: &str = "GOOGALYTICS_TRUNCATION";
    /// Fetch metric batches concurrently
    pub const CONCURRENT_BATCHES: &str = "GOOGALYTICS_CONCURRENT_BATCHES";
    /// HTTP request timeout
    pub const HTTP_TIMEOUT_SECS: &str = "GOOGALYTICS_HTTP_TIMEOUT_SECS";
    /// HTTP connect timeout
    pub const HTTP_CONNECT_TIMEOUT_SECS: &str = "GOOGALYTICS_HTTP_CONNECT_TIMEOUT_SECS";
    /// Attempts on HTTP 429 before giving up
    pub const RETRY_MAX_ATTEMPTS: &str = "GOOGALYTICS_RETRY_MAX_ATTEMPTS";
    /// First backoff delay on HTTP 429
    pub const RETRY_INITIAL_BACKOFF_MS: &str = "GOOGALYTICS_RETRY_INITIAL_BACKOFF_MS";
}
