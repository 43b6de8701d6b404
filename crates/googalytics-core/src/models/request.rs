// ABOUTME: Validated fetch requests, client scope, date ranges and metric batches
// ABOUTME: Every invariant is checked at construction so invalid requests never reach I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;
use crate::constants::{defaults, limits};
use crate::errors::FetchError;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day
    pub start: NaiveDate,
    /// Last day, inclusive
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` if `end` is before `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FetchError> {
        if end < start {
            return Err(FetchError::invalid(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Single-day range
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Number of days covered
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the range
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while({
            let end = self.end;
            move |d| *d <= end
        })
    }
}

/// Which properties a session may query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientScope {
    /// Search Console property (`sc-domain:example.com` or a URL prefix)
    pub sc_domain: Option<String>,
    /// GA3 view id
    pub view_id: Option<String>,
    /// GA4 property id
    pub ga4_property_id: Option<String>,
}

impl ClientScope {
    /// Scope with a Search Console property
    #[must_use]
    pub fn with_sc_domain(mut self, sc_domain: impl Into<String>) -> Self {
        self.sc_domain = Some(sc_domain.into());
        self
    }

    /// Scope with a GA3 view
    #[must_use]
    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    /// Scope with a GA4 property
    #[must_use]
    pub fn with_ga4_property_id(mut self, property_id: impl Into<String>) -> Self {
        self.ga4_property_id = Some(property_id.into());
        self
    }

    /// Scope value the provider needs, if configured
    #[must_use]
    pub fn target_for(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Gsc | ProviderKind::UrlInspection => self.sc_domain.as_deref(),
            ProviderKind::Ga3 => self.view_id.as_deref(),
            ProviderKind::Ga4 => self.ga4_property_id.as_deref(),
        }
    }
}

/// What to do when the row cap is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Return the rows fetched so far and mark the table truncated
    #[default]
    Allow,
    /// Fail the fetch
    Error,
}

/// Per-request behaviour switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Row cap per batch; provider default when `None`
    pub row_limit: Option<usize>,
    /// Behaviour at the row cap
    pub truncation: TruncationPolicy,
    /// Add derived boolean columns
    pub add_boolean_metrics: bool,
    /// Only Google organic traffic (GA3 server-side filter)
    pub filter_google_organic: bool,
    /// Fetch metric batches concurrently
    pub concurrent_batches: bool,
}

/// A validated, immutable fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    provider: ProviderKind,
    dimensions: Vec<String>,
    metrics: Vec<String>,
    date_range: Option<DateRange>,
    url_list: Option<Vec<String>>,
    scope: ClientScope,
    options: FetchOptions,
}

impl FetchRequest {
    /// Start building a request for `provider`
    #[must_use]
    pub fn builder(provider: ProviderKind) -> FetchRequestBuilder {
        FetchRequestBuilder {
            provider,
            dimensions: None,
            metrics: None,
            date_range: None,
            url_list: None,
            scope: ClientScope::default(),
            options: FetchOptions::default(),
        }
    }

    /// Target provider
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Provider-native dimension names
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Provider-native metric names
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Date range, absent only for URL inspection
    #[must_use]
    pub const fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    /// URLs to inspect
    #[must_use]
    pub fn url_list(&self) -> Option<&[String]> {
        self.url_list.as_deref()
    }

    /// Properties the request may touch
    #[must_use]
    pub const fn scope(&self) -> &ClientScope {
        &self.scope
    }

    /// Behaviour switches
    #[must_use]
    pub const fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Batch carrying every dimension and the given metric chunk
    #[must_use]
    pub fn batch(&self, index: usize, metrics: Vec<String>) -> Batch {
        Batch {
            index,
            provider: self.provider,
            dimensions: self.dimensions.clone(),
            metrics,
            date_range: self.date_range,
            url_list: self.url_list.clone(),
            scope: self.scope.clone(),
            filter_google_organic: self.options.filter_google_organic,
        }
    }
}

/// Builder for [`FetchRequest`]; `build` applies defaults and validates
#[derive(Debug, Clone)]
pub struct FetchRequestBuilder {
    provider: ProviderKind,
    dimensions: Option<Vec<String>>,
    metrics: Option<Vec<String>>,
    date_range: Option<DateRange>,
    url_list: Option<Vec<String>>,
    scope: ClientScope,
    options: FetchOptions,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

fn find_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .find(|n| !seen.insert(n.as_str()))
        .map(String::as_str)
}

impl FetchRequestBuilder {
    /// Dimensions; provider defaults when never set
    #[must_use]
    pub fn dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = Some(dimensions.into_iter().map(Into::into).collect());
        self
    }

    /// Metrics; provider defaults when never set
    #[must_use]
    pub fn metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = Some(metrics.into_iter().map(Into::into).collect());
        self
    }

    /// Date range
    #[must_use]
    pub const fn date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = Some(date_range);
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

    /// Client scope
    #[must_use]
    pub fn scope(mut self, scope: ClientScope) -> Self {
        self.scope = scope;
        self
    }

    /// Behaviour switches
    #[must_use]
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply defaults and validate
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRequest` when any request invariant fails
    pub fn build(self) -> Result<FetchRequest, FetchError> {
        let provider = self.provider;
        let dimensions = self
            .dimensions
            .unwrap_or_else(|| default_dimensions(provider));
        let metrics = self.metrics.unwrap_or_else(|| default_metrics(provider));

        if self.scope.target_for(provider).is_none() {
            return Err(FetchError::invalid(format!(
                "client scope has no target for {provider}"
            )));
        }
        if let Some(dup) = find_duplicate(&dimensions) {
            return Err(FetchError::invalid(format!("dimension '{dup}' listed twice")));
        }
        if let Some(dup) = find_duplicate(&metrics) {
            return Err(FetchError::invalid(format!("metric '{dup}' listed twice")));
        }
        if let Some(shared) = dimensions.iter().find(|d| metrics.contains(d)) {
            return Err(FetchError::invalid(format!(
                "'{shared}' requested as both dimension and metric"
            )));
        }
        if self.options.row_limit == Some(0) {
            return Err(FetchError::invalid("row limit must be positive"));
        }

        validate_url_list(provider, self.url_list.as_deref())?;
        validate_date_range(provider, self.date_range)?;
        validate_fields(provider, &dimensions, &metrics)?;

        Ok(FetchRequest {
            provider,
            dimensions,
            metrics,
            date_range: self.date_range.filter(|_| provider.needs_date_range()),
            url_list: self.url_list,
            scope: self.scope,
            options: self.options,
        })
    }
}

fn default_dimensions(provider: ProviderKind) -> Vec<String> {
    match provider {
        ProviderKind::Gsc => owned(defaults::GSC_DIMENSIONS),
        ProviderKind::Ga3 => owned(defaults::GA3_DIMENSIONS),
        ProviderKind::Ga4 => owned(defaults::GA4_DIMENSIONS),
        ProviderKind::UrlInspection => Vec::new(),
    }
}

fn default_metrics(provider: ProviderKind) -> Vec<String> {
    match provider {
        ProviderKind::Gsc => owned(defaults::GSC_METRICS),
        ProviderKind::Ga3 => owned(defaults::GA3_METRICS),
        ProviderKind::Ga4 => owned(defaults::GA4_METRICS),
        ProviderKind::UrlInspection => Vec::new(),
    }
}

fn validate_url_list(provider: ProviderKind, urls: Option<&[String]>) -> Result<(), FetchError> {
    match (provider, urls) {
        (ProviderKind::UrlInspection, None) => {
            Err(FetchError::invalid("URL inspection needs a url list"))
        }
        (ProviderKind::UrlInspection, Some([])) => {
            Err(FetchError::invalid("URL inspection url list is empty"))
        }
        (ProviderKind::UrlInspection, Some(list)) => {
            match list.iter().find(|u| u.trim().is_empty()) {
                Some(_) => Err(FetchError::invalid("url list contains an empty url")),
                None => Ok(()),
            }
        }
        (_, Some(_)) => Err(FetchError::invalid(format!(
            "url list is only accepted for URL inspection, not {provider}"
        ))),
        (_, None) => Ok(()),
    }
}

fn validate_date_range(
    provider: ProviderKind,
    date_range: Option<DateRange>,
) -> Result<(), FetchError> {
    match date_range {
        None if provider.needs_date_range() => Err(FetchError::invalid(format!(
            "{provider} requests need a date range"
        ))),
        Some(range) if range.end < range.start => Err(FetchError::invalid(format!(
            "end date {} is before start date {}",
            range.end, range.start
        ))),
        _ => Ok(()),
    }
}

fn validate_fields(
    provider: ProviderKind,
    dimensions: &[String],
    metrics: &[String],
) -> Result<(), FetchError> {
    match provider {
        ProviderKind::Gsc => {
            if let Some(bad) = dimensions
                .iter()
                .find(|d| !defaults::GSC_VALID_DIMENSIONS.contains(&d.as_str()))
            {
                return Err(FetchError::invalid(format!(
                    "'{bad}' is not a Search Console dimension"
                )));
            }
            if dimensions.len() > 1 && dimensions.iter().any(|d| d == "searchAppearance") {
                return Err(FetchError::invalid(
                    "searchAppearance cannot be combined with other dimensions",
                ));
            }
            if metrics.is_empty() {
                return Err(FetchError::invalid("metric list is empty"));
            }
            if let Some(bad) = metrics
                .iter()
                .find(|m| !defaults::GSC_METRICS.contains(&m.as_str()))
            {
                return Err(FetchError::invalid(format!(
                    "'{bad}' is not a Search Console metric"
                )));
            }
            Ok(())
        }
        ProviderKind::Ga3 | ProviderKind::Ga4 => {
            let max_dims = if provider == ProviderKind::Ga3 {
                limits::GA3_MAX_DIMENSIONS
            } else {
                limits::GA4_MAX_DIMENSIONS
            };
            if dimensions.len() > max_dims {
                return Err(FetchError::invalid(format!(
                    "{provider} accepts at most {max_dims} dimensions, got {}",
                    dimensions.len()
                )));
            }
            if metrics.is_empty() {
                return Err(FetchError::invalid("metric list is empty"));
            }
            if let Some(blank) = dimensions.iter().chain(metrics).find(|f| f.trim().is_empty()) {
                return Err(FetchError::invalid(format!("blank field name '{blank}'")));
            }
            Ok(())
        }
        ProviderKind::UrlInspection => {
            if dimensions.is_empty() && metrics.is_empty() {
                Ok(())
            } else {
                Err(FetchError::invalid(
                    "URL inspection takes no dimensions or metrics",
                ))
            }
        }
    }
}

/// One provider call's worth of fields, derived from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of the metric chunk; merge order follows it
    pub index: usize,
    /// Target provider
    pub provider: ProviderKind,
    /// Every requested dimension
    pub dimensions: Vec<String>,
    /// Metric chunk within the per-call limit
    pub metrics: Vec<String>,
    /// Date range
    pub date_range: Option<DateRange>,
    /// URLs to inspect
    pub url_list: Option<Vec<String>>,
    /// Properties the batch may touch
    pub scope: ClientScope,
    /// GA3 Google-organic server-side filter
    pub filter_google_organic: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn gsc_scope() -> ClientScope {
        ClientScope::default().with_sc_domain("sc-domain:example.com")
    }

    #[test]
    fn test_defaults_applied_when_fields_unset() {
        let request = FetchRequest::builder(ProviderKind::Gsc)
            .scope(gsc_scope())
            .date_range(DateRange::single(day(1)))
            .build()
            .unwrap();
        assert_eq!(request.dimensions().len(), defaults::GSC_DIMENSIONS.len());
        assert_eq!(request.metrics().len(), 4);
    }

    #[test]
    fn test_date_range_days() {
        let range = DateRange::new(day(1), day(7)).unwrap();
        assert_eq!(range.days(), 7);
        assert_eq!(range.iter_days().count(), 7);
        assert!(DateRange::new(day(7), day(1)).is_err());
    }

    #[test]
    fn test_url_list_rejected_for_gsc() {
        let err = FetchRequest::builder(ProviderKind::Gsc)
            .scope(gsc_scope())
            .date_range(DateRange::single(day(1)))
            .url_list(["https://example.com/"])
            .build()
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest { .. }));
    }
}
