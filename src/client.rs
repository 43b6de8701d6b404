// ABOUTME: Session surface tying a transport, a client scope and the fetch pipeline together
// ABOUTME: get_df with the caller-facing defaults, date availability, API status probes and summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Analytics Session
//!
//! An [`AnalyticsSession`] owns the transport and the properties it may query.
//! Adapters are built per fetch from the session's transport, so nothing is
//! kept in process-wide state and two sessions never share credentials.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use googalytics_core::constants::defaults;
use googalytics_core::{
    ClientScope, DateRange, FetchError, FetchOptions, FetchRequest, ProviderKind, ResultTable,
    TruncationPolicy, Value,
};
use googalytics_providers::{initialize_shared_client, Adapter, HttpTransport, RawQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::augment::{add_boolean_metrics, filter_google_organic};
use crate::config::FetchConfig;
use crate::date_utils::{date_range_string, days_before};
use crate::normalizer::RECORD_DATE;
use crate::partitioner;

/// Result selector accepted by [`AnalyticsSession::get_df`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    /// Search Console search analytics
    #[serde(rename = "GSC")]
    Gsc,
    /// Search Console restricted to the `query` dimension
    #[serde(rename = "GSCQ")]
    GscQuery,
    /// Universal Analytics
    #[serde(rename = "GA3")]
    Ga3,
    /// GA4
    #[serde(rename = "GA4")]
    Ga4,
    /// URL inspection
    #[serde(rename = "URL")]
    Url,
}

impl ReportKind {
    /// Provider serving this report
    #[must_use]
    pub const fn provider(self) -> ProviderKind {
        match self {
            Self::Gsc | Self::GscQuery => ProviderKind::Gsc,
            Self::Ga3 => ProviderKind::Ga3,
            Self::Ga4 => ProviderKind::Ga4,
            Self::Url => ProviderKind::UrlInspection,
        }
    }

    /// Short upper-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gsc => "GSC",
            Self::GscQuery => "GSCQ",
            Self::Ga3 => "GA3",
            Self::Ga4 => "GA4",
            Self::Url => "URL",
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GSC" => Ok(Self::Gsc),
            "GSCQ" => Ok(Self::GscQuery),
            "GA3" => Ok(Self::Ga3),
            "GA4" => Ok(Self::Ga4),
            "URL" => Ok(Self::Url),
            other => Err(FetchError::invalid(format!("invalid result '{other}'"))),
        }
    }
}

/// Loosely specified report; unset fields take the session defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    kind: ReportKind,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    dimensions: Option<Vec<String>>,
    metrics: Option<Vec<String>>,
    url_list: Option<Vec<String>>,
    options: FetchOptions,
}

impl ReportQuery {
    /// Query for `kind` with every field defaulted
    #[must_use]
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            start_date: None,
            end_date: None,
            dimensions: None,
            metrics: None,
            url_list: None,
            options: FetchOptions::default(),
        }
    }

    /// Selected report
    #[must_use]
    pub const fn kind(&self) -> ReportKind {
        self.kind
    }

    /// First reporting day
    #[must_use]
    pub const fn start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Last reporting day; the start date when unset
    #[must_use]
    pub const fn end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Provider-native dimensions; ignored for `GSCQ`
    #[must_use]
    pub fn dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = Some(dimensions.into_iter().map(Into::into).collect());
        self
    }

    /// Provider-native metrics
    #[must_use]
    pub fn metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = Some(metrics.into_iter().map(Into::into).collect());
        self
    }

    /// URLs to inspect
    #[must_use]
    pub fn url_list<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_list = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// Row cap per metric batch
    #[must_use]
    pub const fn row_limit(mut self, row_limit: usize) -> Self {
        self.options.row_limit = Some(row_limit);
        self
    }

    /// Behaviour at the row cap
    #[must_use]
    pub const fn truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.options.truncation = truncation;
        self
    }

    /// Add derived boolean columns
    #[must_use]
    pub const fn add_boolean_metrics(mut self, enabled: bool) -> Self {
        self.options.add_boolean_metrics = enabled;
        self
    }

    /// Keep Google organic traffic only
    #[must_use]
    pub const fn filter_google_organic(mut self, enabled: bool) -> Self {
        self.options.filter_google_organic = enabled;
        self
    }

    /// Fetch metric batches concurrently
    #[must_use]
    pub const fn concurrent_batches(mut self, enabled: bool) -> Self {
        self.options.concurrent_batches = enabled;
        self
    }

    /// Reporting window relative to `today`
    ///
    /// Search Console data lags, so its default start is three days back;
    /// every other report defaults to `today`. The end defaults to the start.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` if the end is before the start
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, FetchError> {
        let start = self.start_date.unwrap_or_else(|| match self.kind {
            ReportKind::Gsc | ReportKind::GscQuery => days_before(today, defaults::GSC_LAG_DAYS),
            ReportKind::Ga3 | ReportKind::Ga4 | ReportKind::Url => today,
        });
        DateRange::new(start, self.end_date.unwrap_or(start))
    }

    /// Validated request for `scope`, with dates resolved against `today`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` when the resulting request is invalid
    pub fn to_request(
        &self,
        scope: ClientScope,
        today: NaiveDate,
    ) -> Result<FetchRequest, FetchError> {
        let provider = self.kind.provider();
        let mut builder = FetchRequest::builder(provider)
            .scope(scope)
            .options(self.options.clone());
        if provider.needs_date_range() {
            builder = builder.date_range(self.date_range(today)?);
        }
        if self.kind == ReportKind::GscQuery {
            builder = builder.dimensions(defaults::GSC_QUERY_DIMENSIONS.iter().copied());
        } else if let Some(dimensions) = &self.dimensions {
            builder = builder.dimensions(dimensions.iter().cloned());
        }
        if let Some(metrics) = &self.metrics {
            builder = builder.metrics(metrics.iter().cloned());
        }
        if let Some(urls) = &self.url_list {
            builder = builder.url_list(urls.iter().cloned());
        }
        builder.build()
    }
}

/// Outcome of an API status probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiState {
    /// The probe returned data
    Success,
    /// The API answered with an error status
    HttpError,
    /// The probe failed without an HTTP answer
    OtherError,
    /// The session scope has no property for the provider
    NotConfigured,
}

/// Result of [`AnalyticsSession::api_status`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    /// Probe outcome
    pub state: ApiState,
    /// Error text when the probe failed
    pub error: Option<String>,
    /// When the probe ran
    pub checked_at: DateTime<Utc>,
}

impl ApiStatus {
    fn new(state: ApiState, error: Option<String>) -> Self {
        Self {
            state,
            error,
            checked_at: Utc::now(),
        }
    }
}

/// Status and date coverage of one configured provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Provider
    pub provider: ProviderKind,
    /// Property queried
    pub target: String,
    /// Probe result
    pub status: ApiStatus,
    /// Number of days with data
    pub date_count: usize,
    /// Human-readable coverage, e.g. `2024-01-01 to 2024-03-31 (97%)`
    pub available_dates: String,
}

/// Overview of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Properties the session may query
    pub scope: ClientScope,
    /// One entry per configured reporting provider
    pub providers: Vec<ProviderSummary>,
}

/// Entry point for fetching reports
pub struct AnalyticsSession {
    transport: Arc<dyn RawQuery>,
    scope: ClientScope,
    config: FetchConfig,
}

impl AnalyticsSession {
    /// Session over `transport` limited to `scope`, with default configuration
    #[must_use]
    pub fn new(transport: Arc<dyn RawQuery>, scope: ClientScope) -> Self {
        debug!(?scope, "Creating analytics session");
        Self {
            transport,
            scope,
            config: FetchConfig::default(),
        }
    }

    /// Session over the live APIs authenticated with `access_token`
    ///
    /// The configuration's timeouts apply to the shared HTTP client if it has
    /// not been built yet; its retry policy applies to this transport.
    #[must_use]
    pub fn with_access_token(
        access_token: impl Into<String>,
        scope: ClientScope,
        config: FetchConfig,
    ) -> Self {
        if !initialize_shared_client(config.http) {
            debug!("Shared HTTP client already configured, keeping its timeouts");
        }
        let transport = HttpTransport::new(access_token).with_retry(config.retry.clone());
        Self::new(Arc::new(transport), scope).with_config(config)
    }

    /// Replace the fetch configuration
    #[must_use]
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Properties this session may query
    #[must_use]
    pub const fn scope(&self) -> &ClientScope {
        &self.scope
    }

    /// Active fetch configuration
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a report with the session defaults filled in
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` before any I/O when the query is
    /// invalid, otherwise whatever [`AnalyticsSession::fetch`] returns
    #[instrument(skip_all, fields(report = %query.kind()))]
    pub async fn get_df(&self, query: ReportQuery) -> Result<ResultTable, FetchError> {
        let request = query.to_request(self.scope.clone(), today())?;
        self.fetch(&request).await
    }

    /// Fetch, normalize, merge and post-process a validated request
    ///
    /// The Google-organic table filter applies when the result carries
    /// `source` and `medium`; boolean columns are added after it.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` when the session scope cannot serve
    /// the request, otherwise the pipeline's error
    pub async fn fetch(&self, request: &FetchRequest) -> Result<ResultTable, FetchError> {
        let provider = request.provider();
        let adapter = Adapter::for_provider(provider, Arc::clone(&self.transport), request.scope())
            .map_err(|e| FetchError::invalid(e.to_string()))?;
        let mut table = partitioner::fetch(&adapter, request, &self.config).await?;

        let options = request.options();
        if options.filter_google_organic && table.has_column("source") && table.has_column("medium")
        {
            table = filter_google_organic(&table)?;
        }
        if options.add_boolean_metrics {
            add_boolean_metrics(&mut table, provider)?;
        }
        Ok(table)
    }

    /// Days for which `provider` holds data, sorted ascending
    ///
    /// The range ends yesterday by default and starts 500 days back for
    /// Search Console and 1500 days back for Analytics.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` for URL inspection or an
    /// unconfigured provider, otherwise the fetch error
    #[instrument(skip(self))]
    pub async fn available_dates(
        &self,
        provider: ProviderKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<NaiveDate>, FetchError> {
        let today = today();
        let end = end.unwrap_or_else(|| days_before(today, 1));
        let lookback = if provider == ProviderKind::Gsc {
            defaults::GSC_AVAILABLE_DATES_DAYS
        } else {
            defaults::GA_AVAILABLE_DATES_DAYS
        };
        let start = start.unwrap_or_else(|| days_before(today, lookback));
        let request = self.date_probe(provider, DateRange::new(start, end)?)?;
        let table = self.fetch(&request).await?;

        let mut dates: Vec<NaiveDate> = table
            .column(RECORD_DATE)
            .map(|cells| cells.into_iter().filter_map(Value::as_date).collect())
            .unwrap_or_default();
        dates.sort_unstable();
        dates.dedup();
        debug!(provider = %provider, days = dates.len(), "Available dates resolved");
        Ok(dates)
    }

    /// Probe `provider` with a seven-day date-only report
    ///
    /// URL inspection shares the Search Console property and is probed
    /// through it.
    #[instrument(skip(self))]
    pub async fn api_status(&self, provider: ProviderKind) -> ApiStatus {
        let provider = match provider {
            ProviderKind::UrlInspection => ProviderKind::Gsc,
            other => other,
        };
        if self.scope.target_for(provider).is_none() {
            return ApiStatus::new(ApiState::NotConfigured, None);
        }
        let today = today();
        let range = DateRange {
            start: days_before(today, defaults::API_STATUS_DAYS),
            end: today,
        };
        let result = match self.date_probe(provider, range) {
            Ok(request) => self.fetch(&request).await.map(|_| ()),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                debug!(provider = %provider, "API probe succeeded");
                ApiStatus::new(ApiState::Success, None)
            }
            Err(err) => {
                let state = match err.provider_error() {
                    Some(source) if source.is_http_error() => ApiState::HttpError,
                    _ => ApiState::OtherError,
                };
                warn!(provider = %provider, error = %err, "API probe failed");
                ApiStatus::new(state, Some(err.to_string()))
            }
        }
    }

    /// Scope, API status and date coverage of every configured provider
    pub async fn summary(&self) -> SessionSummary {
        let mut providers = Vec::new();
        for provider in [ProviderKind::Gsc, ProviderKind::Ga3, ProviderKind::Ga4] {
            let Some(target) = self.scope.target_for(provider) else {
                continue;
            };
            let status = self.api_status(provider).await;
            let dates = if status.state == ApiState::Success {
                self.available_dates(provider, None, None)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(provider = %provider, error = %err, "Available dates unavailable");
                        Vec::new()
                    })
            } else {
                Vec::new()
            };
            providers.push(ProviderSummary {
                provider,
                target: target.to_owned(),
                status,
                date_count: dates.len(),
                available_dates: date_range_string(
                    &dates,
                    &format!("No dates available from {provider}"),
                ),
            });
        }
        info!(providers = providers.len(), "Session summary built");
        SessionSummary {
            scope: self.scope.clone(),
            providers,
        }
    }

    fn date_probe(
        &self,
        provider: ProviderKind,
        range: DateRange,
    ) -> Result<FetchRequest, FetchError> {
        let builder = FetchRequest::builder(provider)
            .scope(self.scope.clone())
            .date_range(range);
        let builder = match provider {
            ProviderKind::Gsc => builder.dimensions(["date"]),
            ProviderKind::Ga3 => builder.dimensions(["ga:date"]).metrics(["ga:sessions"]),
            ProviderKind::Ga4 => builder.dimensions(["date"]).metrics(["sessions"]),
            ProviderKind::UrlInspection => {
                return Err(FetchError::invalid("URL inspection has no reporting dates"));
            }
        };
        builder.build()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("gscq".parse::<ReportKind>().unwrap(), ReportKind::GscQuery);
        assert_eq!("URL".parse::<ReportKind>().unwrap().provider(), ProviderKind::UrlInspection);
        assert!("GA5".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_default_dates_follow_provider_lag() {
        let today = day(2024, 3, 10);
        let gsc = ReportQuery::new(ReportKind::Gsc).date_range(today).unwrap();
        assert_eq!(gsc, DateRange::single(day(2024, 3, 7)));
        let ga = ReportQuery::new(ReportKind::Ga4).date_range(today).unwrap();
        assert_eq!(ga, DateRange::single(today));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let query = ReportQuery::new(ReportKind::Ga3)
            .start_date(day(2024, 3, 10))
            .end_date(day(2024, 3, 1));
        assert!(matches!(
            query.date_range(day(2024, 3, 10)),
            Err(FetchError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_gscq_forces_query_dimension() {
        let scope = ClientScope::default().with_sc_domain("sc-domain:example.com");
        let request = ReportQuery::new(ReportKind::GscQuery)
            .dimensions(["page"])
            .to_request(scope, day(2024, 3, 10))
            .unwrap();
        assert_eq!(request.dimensions(), ["query".to_owned()]);
    }
}
