// ABOUTME: Deterministic in-memory transport for development and testing
// ABOUTME: Serves Search Console, GA3, GA4 and URL inspection responses from fixed records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

// Mutex poisoning errors are converted to ProviderError::ConfigurationError

//! # Synthetic Transport
//!
//! A [`RawQuery`] implementation that answers every reporting method from a
//! fixed list of [`SyntheticRecord`]s, without network access or credentials.
//!
//! - Records are aggregated by the requested dimensions, in order of first
//!   appearance, with metrics summed.
//! - A record only contributes to a response when it carries at least one of
//!   the requested metrics, so different metric batches can see different
//!   dimension tuples.
//! - Missing dimensions read as `(not set)`, missing metrics as zero.
//! - Offsets, row limits and page tokens are honoured exactly as the real APIs
//!   do, so pagination can be exercised against any page size.
//! - Failures can be injected on the n-th call, and every request is logged.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use googalytics_core::constants::defaults;
use googalytics_core::{ProviderError, ProviderKind};
use serde_json::{json, Value as JsonValue};

use crate::transport::{NativeEndpoint, NativeRequest, RawQuery};

/// Value reported for a dimension a record does not carry
pub const NOT_SET: &str = "(not set)";

/// One fact row keyed by provider-native field names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntheticRecord {
    dimensions: BTreeMap<String, String>,
    metrics: BTreeMap<String, f64>,
}

impl SyntheticRecord {
    /// Empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a dimension value
    #[must_use]
    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    /// Set a metric value
    #[must_use]
    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }
}

/// Aggregated rows for one request: dimension values then metric values
type Aggregate = Vec<(Vec<String>, Vec<f64>)>;

/// In-memory reporting backend
#[derive(Debug, Default)]
pub struct SyntheticTransport {
    records: Vec<SyntheticRecord>,
    inspections: HashMap<String, JsonValue>,
    failures: Mutex<HashMap<usize, ProviderError>>,
    calls: Mutex<Vec<NativeRequest>>,
}

impl SyntheticTransport {
    /// Transport serving `records`
    #[must_use]
    pub fn new(records: Vec<SyntheticRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Canned URL inspection response for `url`
    ///
    /// URLs without one get a passing, indexed result.
    #[must_use]
    pub fn with_inspection(mut self, url: impl Into<String>, response: JsonValue) -> Self {
        self.inspections.insert(url.into(), response);
        self
    }

    /// Fail the `call`-th request (1-based) with `error`
    #[must_use]
    pub fn fail_on_call(self, call: usize, error: ProviderError) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(call, error);
        }
        self
    }

    /// Every request received so far
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::ConfigurationError` if the call log lock is poisoned
    pub fn calls(&self) -> Result<Vec<NativeRequest>, ProviderError> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .map_err(|_| poisoned("call log"))
    }

    /// Number of requests received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map_or(0, |calls| calls.len())
    }

    fn record_call(&self, request: &NativeRequest) -> Result<(), ProviderError> {
        let call = {
            let mut calls = self.calls.lock().map_err(|_| poisoned("call log"))?;
            calls.push(request.clone());
            calls.len()
        };
        let failure = self
            .failures
            .lock()
            .map_err(|_| poisoned("failure table"))?
            .remove(&call);
        failure.map_or(Ok(()), Err)
    }

    fn aggregate(&self, dimensions: &[String], metrics: &[String], organic_only: bool) -> Aggregate {
        let mut order: Vec<Vec<String>> = Vec::new();
        let mut sums: HashMap<Vec<String>, Vec<f64>> = HashMap::new();
        for record in &self.records {
            if !metrics.iter().any(|m| record.metrics.contains_key(m)) {
                continue;
            }
            if organic_only && !is_google_organic(record) {
                continue;
            }
            let key: Vec<String> = dimensions
                .iter()
                .map(|d| record.dimensions.get(d).map_or(NOT_SET, String::as_str).to_owned())
                .collect();
            let totals = sums.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                vec![0.0; metrics.len()]
            });
            for (total, metric) in totals.iter_mut().zip(metrics) {
                *total += record.metrics.get(metric).copied().unwrap_or(0.0);
            }
        }
        order
            .into_iter()
            .filter_map(|key| sums.remove(&key).map(|totals| (key, totals)))
            .collect()
    }

    fn search_analytics(&self, body: &JsonValue) -> JsonValue {
        let dimensions = string_list(&body["dimensions"], None);
        let metrics: Vec<String> = defaults::GSC_METRICS.iter().map(|m| (*m).to_owned()).collect();
        let rows = self.aggregate(&dimensions, &metrics, false);
        let start = usize_field(&body["startRow"]).unwrap_or(0);
        let limit = usize_field(&body["rowLimit"]).unwrap_or(usize::MAX);
        let page: Vec<JsonValue> = rows
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|(keys, values)| {
                json!({
                    "keys": keys,
                    "clicks": values[0],
                    "impressions": values[1],
                    "ctr": values[2],
                    "position": values[3],
                })
            })
            .collect();
        if page.is_empty() {
            json!({ "responseAggregationType": "byProperty" })
        } else {
            json!({ "rows": page, "responseAggregationType": "byProperty" })
        }
    }

    fn batch_get(&self, body: &JsonValue) -> JsonValue {
        let report = &body["reportRequests"][0];
        let dimensions = string_list(&report["dimensions"], Some("name"));
        let metrics = string_list(&report["metrics"], Some("expression"));
        let organic = report.get("dimensionFilterClauses").is_some();
        let rows = self.aggregate(&dimensions, &metrics, organic);
        let total = rows.len();
        let start: usize = report["pageToken"]
            .as_str()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let size = usize_field(&report["pageSize"]).unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(total);
        let page: Vec<JsonValue> = rows
            .into_iter()
            .skip(start)
            .take(size)
            .map(|(keys, values)| {
                json!({
                    "dimensions": keys,
                    "metrics": [{ "values": values.iter().map(f64::to_string).collect::<Vec<_>>() }],
                })
            })
            .collect();
        let mut report_json = json!({
            "columnHeader": {
                "dimensions": dimensions,
                "metricHeader": {
                    "metricHeaderEntries": metrics.iter()
                        .map(|m| json!({ "name": m, "type": "INTEGER" }))
                        .collect::<Vec<_>>(),
                },
            },
            "data": { "rows": page, "rowCount": total },
        });
        if end < total {
            report_json["nextPageToken"] = JsonValue::String(end.to_string());
        }
        json!({ "reports": [report_json] })
    }

    fn run_report(&self, body: &JsonValue) -> JsonValue {
        let dimensions = string_list(&body["dimensions"], Some("name"));
        let metrics = string_list(&body["metrics"], Some("name"));
        let organic = body.get("dimensionFilter").is_some();
        let rows = self.aggregate(&dimensions, &metrics, organic);
        let total = rows.len();
        let offset = usize_field(&body["offset"]).unwrap_or(0);
        let limit = usize_field(&body["limit"]).unwrap_or(usize::MAX);
        let page: Vec<JsonValue> = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(keys, values)| {
                json!({
                    "dimensionValues": keys.iter().map(|k| json!({ "value": k })).collect::<Vec<_>>(),
                    "metricValues": values.iter().map(|v| json!({ "value": v.to_string() })).collect::<Vec<_>>(),
                })
            })
            .collect();
        json!({
            "dimensionHeaders": dimensions.iter().map(|d| json!({ "name": d })).collect::<Vec<_>>(),
            "metricHeaders": metrics.iter().map(|m| json!({ "name": m, "type": "TYPE_INTEGER" })).collect::<Vec<_>>(),
            "rows": page,
            "rowCount": total,
            "metadata": { "currencyCode": "USD", "timeZone": "Etc/UTC" },
            "propertyQuota": {
                "tokensPerDay": { "consumed": 1, "remaining": 199_999 },
                "tokensPerHour": { "consumed": 1, "remaining": 39_999 },
            },
        })
    }

    fn inspect(&self, body: &JsonValue) -> JsonValue {
        let url = body["inspectionUrl"].as_str().unwrap_or_default();
        self.inspections.get(url).cloned().unwrap_or_else(|| {
            json!({
                "inspectionResult": {
                    "indexStatusResult": {
                        "verdict": "PASS",
                        "coverageState": "Submitted and indexed",
                        "robotsTxtState": "ALLOWED",
                        "indexingState": "INDEXING_ALLOWED",
                        "lastCrawlTime": "2024-01-01T00:00:00Z",
                        "pageFetchState": "SUCCESSFUL",
                        "googleCanonical": url,
                        "userCanonical": url,
                        "crawledAs": "MOBILE",
                    },
                    "mobileUsabilityResult": { "verdict": "PASS" },
                }
            })
        })
    }
}

#[async_trait]
impl RawQuery for SyntheticTransport {
    async fn raw_query(&self, request: &NativeRequest) -> Result<JsonValue, ProviderError> {
        self.record_call(request)?;
        Ok(match &request.endpoint {
            NativeEndpoint::SearchAnalyticsQuery { .. } => self.search_analytics(&request.body),
            NativeEndpoint::ReportsBatchGet => self.batch_get(&request.body),
            NativeEndpoint::RunReport { .. } => self.run_report(&request.body),
            NativeEndpoint::UrlInspection => self.inspect(&request.body),
        })
    }
}

fn poisoned(what: &str) -> ProviderError {
    ProviderError::ConfigurationError {
        provider: "synthetic".to_owned(),
        details: format!("Mutex poisoned: {what} lock"),
    }
}

fn is_google_organic(record: &SyntheticRecord) -> bool {
    let get = |name: &str| record.dimensions.get(name).map(String::as_str);
    match get("ga:sourceMedium").or_else(|| get("sessionSourceMedium")) {
        Some(source_medium) => source_medium == "google / organic",
        None => get("sessionSource") == Some("google") && get("sessionMedium") == Some("organic"),
    }
}

fn string_list(value: &JsonValue, field: Option<&str>) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match field {
                    Some(field) => item[field].as_str(),
                    None => item.as_str(),
                })
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn usize_field(value: &JsonValue) -> Option<usize> {
    value.as_u64().and_then(|v| usize::try_from(v).ok())
}

/// Rate-limit error suitable for `fail_on_call`
#[must_use]
pub fn rate_limited(provider: ProviderKind) -> ProviderError {
    ProviderError::RateLimitExceeded {
        provider: provider.to_string(),
        retry_after_secs: None,
    }
}
