// ABOUTME: Search Console URL inspection adapter
// ABOUTME: One index:inspect call per URL, one row per URL, no date range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use googalytics_core::{
    Batch, Column, Page, PageCursor, PageInfo, ProviderError, ProviderKind, ResultTable, Row,
    Value,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::adapter::{decode, required_offset, ReportingAdapter};
use crate::transport::{NativeEndpoint, NativeRequest, RawQuery};

/// Columns of an inspection table, all descriptive
pub const INSPECTION_COLUMNS: &[&str] = &[
    "record_date",
    "record_time",
    "url",
    "response",
    "index_status_result_verdict",
    "coverage_state",
    "robotstxt_state",
    "indexing_state",
    "last_crawl_time",
    "page_fetch_state",
    "google_canonical",
    "user_canonical",
    "sitemap",
    "referring_urls",
    "crawled_as",
    "mobile_usability_result_verdict",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectResponse {
    inspection_result: Option<InspectionResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InspectionResult {
    index_status_result: Option<IndexStatusResult>,
    mobile_usability_result: Option<VerdictOnly>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStatusResult {
    verdict: Option<String>,
    coverage_state: Option<String>,
    robots_txt_state: Option<String>,
    indexing_state: Option<String>,
    last_crawl_time: Option<DateTime<Utc>>,
    page_fetch_state: Option<String>,
    google_canonical: Option<String>,
    user_canonical: Option<String>,
    sitemap: Option<Vec<String>>,
    referring_urls: Option<Vec<String>>,
    crawled_as: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VerdictOnly {
    verdict: Option<String>,
}

/// Search Console URL inspection adapter
#[derive(Clone)]
pub struct UrlInspectionAdapter {
    transport: Arc<dyn RawQuery>,
    site_url: String,
}

impl UrlInspectionAdapter {
    /// Adapter inspecting URLs of one Search Console property
    #[must_use]
    pub fn new(transport: Arc<dyn RawQuery>, site_url: impl Into<String>) -> Self {
        Self {
            transport,
            site_url: site_url.into(),
        }
    }

    async fn inspect(&self, url: &str, inspected_at: DateTime<Utc>) -> Result<Row, ProviderError> {
        let request = NativeRequest {
            endpoint: NativeEndpoint::UrlInspection,
            body: json!({ "inspectionUrl": url, "siteUrl": self.site_url }),
        };
        let response: InspectResponse = decode(
            ProviderKind::UrlInspection,
            self.transport.raw_query(&request).await?,
        )?;
        Ok(inspection_row(url, inspected_at, response))
    }
}

fn inspection_row(url: &str, inspected_at: DateTime<Utc>, response: InspectResponse) -> Row {
    let result = response.inspection_result.unwrap_or_default();
    let has_status = result.index_status_result.is_some();
    let status = result.index_status_result.unwrap_or_default();
    let minute = NaiveTime::from_hms_opt(inspected_at.hour(), inspected_at.minute(), 0)
        .map_or(Value::Null, Value::Time);
    vec![
        Value::Date(inspected_at.date_naive()),
        minute,
        Value::text(url),
        Value::text(if has_status { "success" } else { "empty" }),
        Value::optional_text(status.verdict),
        Value::optional_text(status.coverage_state),
        Value::optional_text(status.robots_txt_state),
        Value::optional_text(status.indexing_state),
        status.last_crawl_time.map_or(Value::Null, Value::Timestamp),
        Value::optional_text(status.page_fetch_state),
        Value::optional_text(status.google_canonical),
        Value::optional_text(status.user_canonical),
        status.sitemap.map_or(Value::Null, Value::List),
        status.referring_urls.map_or(Value::Null, Value::List),
        Value::optional_text(status.crawled_as),
        Value::optional_text(result.mobile_usability_result.and_then(|m| m.verdict)),
    ]
}

#[async_trait]
impl ReportingAdapter for UrlInspectionAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::UrlInspection
    }

    fn raw_columns(&self, _batch: &Batch) -> Vec<Column> {
        INSPECTION_COLUMNS.iter().map(|c| Column::dimension(*c)).collect()
    }

    #[instrument(skip(self, batch), fields(site = %self.site_url))]
    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError> {
        let urls = batch.url_list.as_deref().unwrap_or_default();
        let start = required_offset(ProviderKind::UrlInspection, cursor)?.min(urls.len());
        let end = start.saturating_add(page_size).min(urls.len());

        let inspected_at = Utc::now();
        let mut rows = Vec::with_capacity(end - start);
        for url in &urls[start..end] {
            debug!(url = %url, "Inspecting URL");
            rows.push(self.inspect(url, inspected_at).await?);
        }

        let table = ResultTable::from_rows(self.raw_columns(batch), rows).map_err(|e| {
            ProviderError::InvalidData {
                provider: ProviderKind::UrlInspection.to_string(),
                field: "rows".to_owned(),
                reason: e.to_string(),
            }
        })?;
        Ok(Page {
            table,
            next: (end < urls.len()).then_some(PageCursor::Offset(end)),
            info: PageInfo {
                total_rows: Some(urls.len()),
                ..PageInfo::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_index_status_marks_row_empty() {
        let row = inspection_row("https://example.com/a", Utc::now(), InspectResponse::default());
        assert_eq!(row.len(), INSPECTION_COLUMNS.len());
        assert_eq!(row[3], Value::text("empty"));
        assert_eq!(row[4], Value::Null);
    }
}
