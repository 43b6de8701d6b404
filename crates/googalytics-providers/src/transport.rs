// ABOUTME: Raw query seam between adapters and the wire
// ABOUTME: Adapters build native JSON requests; a transport executes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Transport Seam
//!
//! Every adapter reduces a page request to a [`NativeRequest`]: the endpoint it
//! targets plus the JSON body the reporting API expects. A [`RawQuery`]
//! implementation turns that into the provider's JSON response. The HTTP
//! transport and the synthetic transport are the two implementations shipped
//! here; callers can supply their own (for recorded fixtures, proxies, etc.).

use async_trait::async_trait;
use googalytics_core::constants::endpoints;
use googalytics_core::{ProviderError, ProviderKind};
use serde_json::Value as JsonValue;

/// Reporting API method a request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEndpoint {
    /// `searchAnalytics/query` on a Search Console property
    SearchAnalyticsQuery {
        /// Property, as registered in Search Console
        site_url: String,
    },
    /// `urlInspection/index:inspect`
    UrlInspection,
    /// GA3 `reports:batchGet`
    ReportsBatchGet,
    /// GA4 `properties/{id}:runReport`
    RunReport {
        /// GA4 property id
        property_id: String,
    },
}

impl NativeEndpoint {
    /// Provider the endpoint belongs to
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        match self {
            Self::SearchAnalyticsQuery { .. } => ProviderKind::Gsc,
            Self::UrlInspection => ProviderKind::UrlInspection,
            Self::ReportsBatchGet => ProviderKind::Ga3,
            Self::RunReport { .. } => ProviderKind::Ga4,
        }
    }

    /// Path below the API root
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::SearchAnalyticsQuery { site_url } => format!(
                "/webmasters/v3/sites/{}/searchAnalytics/query",
                urlencoding::encode(site_url)
            ),
            Self::UrlInspection => "/v1/urlInspection/index:inspect".to_owned(),
            Self::ReportsBatchGet => "/v4/reports:batchGet".to_owned(),
            Self::RunReport { property_id } => {
                format!("/v1beta/properties/{property_id}:runReport")
            }
        }
    }
}

/// Provider-native request
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRequest {
    /// Target method
    pub endpoint: NativeEndpoint,
    /// JSON body in the provider's own schema
    pub body: JsonValue,
}

impl NativeRequest {
    /// Provider the request belongs to
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.endpoint.provider()
    }
}

/// API roots, overridable for proxies and local fakes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBaseUrls {
    /// Search Console root (search analytics and URL inspection)
    pub search_console: String,
    /// GA3 reporting root
    pub analytics_reporting: String,
    /// GA4 data root
    pub analytics_data: String,
}

impl Default for ApiBaseUrls {
    fn default() -> Self {
        Self {
            search_console: endpoints::SEARCH_CONSOLE_BASE.to_owned(),
            analytics_reporting: endpoints::ANALYTICS_REPORTING_BASE.to_owned(),
            analytics_data: endpoints::ANALYTICS_DATA_BASE.to_owned(),
        }
    }
}

impl ApiBaseUrls {
    /// Full URL for an endpoint
    #[must_use]
    pub fn url_for(&self, endpoint: &NativeEndpoint) -> String {
        let base = match endpoint {
            NativeEndpoint::SearchAnalyticsQuery { .. } | NativeEndpoint::UrlInspection => {
                &self.search_console
            }
            NativeEndpoint::ReportsBatchGet => &self.analytics_reporting,
            NativeEndpoint::RunReport { .. } => &self.analytics_data,
        };
        format!("{}{}", base.trim_end_matches('/'), endpoint.path())
    }
}

/// Executes provider-native requests
///
/// Implementations own authentication and wire-level retry. The fetch
/// pipeline never retries on its own.
#[async_trait]
pub trait RawQuery: Send + Sync {
    /// Execute one request and return the provider's JSON response
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` carrying the provider name and raw status
    async fn raw_query(&self, request: &NativeRequest) -> Result<JsonValue, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_is_percent_encoded() {
        let endpoint = NativeEndpoint::SearchAnalyticsQuery {
            site_url: "https://www.example.com/".to_owned(),
        };
        assert_eq!(
            ApiBaseUrls::default().url_for(&endpoint),
            "https://searchconsole.googleapis.com/webmasters/v3/sites/https%3A%2F%2Fwww.example.com%2F/searchAnalytics/query"
        );
    }

    #[test]
    fn test_run_report_url() {
        let endpoint = NativeEndpoint::RunReport {
            property_id: "1234".to_owned(),
        };
        assert_eq!(
            ApiBaseUrls::default().url_for(&endpoint),
            "https://analyticsdata.googleapis.com/v1beta/properties/1234:runReport"
        );
    }
}
