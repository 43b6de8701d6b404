// ABOUTME: GA4 data API adapter
// ABOUTME: Offset pagination over properties/{id}:runReport with property quota reporting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use async_trait::async_trait;
use googalytics_core::{
    Batch, Column, Page, PageCursor, PageInfo, PropertyQuota, ProviderError, ProviderKind,
    QuotaStatus, ResultTable, Row, Value,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, instrument};

use crate::adapter::{decode, range_strings, required_offset, required_range, ReportingAdapter};
use crate::transport::{NativeEndpoint, NativeRequest, RawQuery};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunReportResponse {
    #[serde(default)]
    rows: Vec<ReportRow>,
    row_count: Option<usize>,
    #[serde(default)]
    metadata: ResponseMetadata,
    property_quota: Option<WireQuota>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRow {
    #[serde(default)]
    dimension_values: Vec<CellValue>,
    #[serde(default)]
    metric_values: Vec<CellValue>,
}

#[derive(Debug, Deserialize)]
struct CellValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseMetadata {
    currency_code: Option<String>,
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuota {
    tokens_per_day: Option<WireQuotaStatus>,
    tokens_per_hour: Option<WireQuotaStatus>,
    concurrent_requests: Option<WireQuotaStatus>,
    server_errors_per_project_per_hour: Option<WireQuotaStatus>,
    potentially_thresholded_requests_per_hour: Option<WireQuotaStatus>,
}

#[derive(Debug, Deserialize)]
struct WireQuotaStatus {
    #[serde(default)]
    consumed: i64,
    #[serde(default)]
    remaining: i64,
}

impl From<WireQuotaStatus> for QuotaStatus {
    fn from(wire: WireQuotaStatus) -> Self {
        Self {
            consumed: wire.consumed,
            remaining: wire.remaining,
        }
    }
}

impl From<WireQuota> for PropertyQuota {
    fn from(wire: WireQuota) -> Self {
        Self {
            tokens_per_day: wire.tokens_per_day.map(Into::into),
            tokens_per_hour: wire.tokens_per_hour.map(Into::into),
            concurrent_requests: wire.concurrent_requests.map(Into::into),
            server_errors_per_project_per_hour: wire
                .server_errors_per_project_per_hour
                .map(Into::into),
            potentially_thresholded_requests_per_hour: wire
                .potentially_thresholded_requests_per_hour
                .map(Into::into),
        }
    }
}

/// GA4 data API adapter
#[derive(Clone)]
pub struct Ga4Adapter {
    transport: Arc<dyn RawQuery>,
    property_id: String,
}

impl Ga4Adapter {
    /// Adapter for one GA4 property
    #[must_use]
    pub fn new(transport: Arc<dyn RawQuery>, property_id: impl Into<String>) -> Self {
        let property_id: String = property_id.into();
        Self {
            transport,
            property_id: property_id.trim_start_matches("properties/").to_owned(),
        }
    }

    fn build_request(
        &self,
        batch: &Batch,
        offset: usize,
        limit: usize,
    ) -> Result<NativeRequest, ProviderError> {
        let (start_date, end_date) = range_strings(required_range(batch)?);
        let mut body = json!({
            "dateRanges": [{ "startDate": start_date, "endDate": end_date }],
            "dimensions": batch.dimensions.iter().map(|d| json!({ "name": d })).collect::<Vec<_>>(),
            "metrics": batch.metrics.iter().map(|m| json!({ "name": m })).collect::<Vec<_>>(),
            "limit": limit,
            "offset": offset,
            "returnPropertyQuota": true,
        });
        if batch.filter_google_organic {
            if let Some(map) = body.as_object_mut() {
                map.insert("dimensionFilter".to_owned(), organic_filter());
            }
        }
        Ok(NativeRequest {
            endpoint: NativeEndpoint::RunReport {
                property_id: self.property_id.clone(),
            },
            body,
        })
    }

    fn invalid(reason: String) -> ProviderError {
        ProviderError::InvalidData {
            provider: ProviderKind::Ga4.to_string(),
            field: "rows".to_owned(),
            reason,
        }
    }
}

fn organic_filter() -> JsonValue {
    let exact = |field: &str, value: &str| {
        json!({
            "filter": {
                "fieldName": field,
                "stringFilter": { "matchType": "EXACT", "value": value },
            }
        })
    };
    json!({
        "andGroup": {
            "expressions": [exact("sessionSource", "google"), exact("sessionMedium", "organic")]
        }
    })
}

#[async_trait]
impl ReportingAdapter for Ga4Adapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ga4
    }

    fn raw_columns(&self, batch: &Batch) -> Vec<Column> {
        batch
            .dimensions
            .iter()
            .map(Column::dimension)
            .chain(batch.metrics.iter().map(Column::metric))
            .collect()
    }

    #[instrument(skip(self, batch), fields(property = %self.property_id, batch = batch.index))]
    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError> {
        let offset = required_offset(ProviderKind::Ga4, cursor)?;
        let request = self.build_request(batch, offset, page_size)?;
        let response: RunReportResponse =
            decode(ProviderKind::Ga4, self.transport.raw_query(&request).await?)?;

        let rows = response
            .rows
            .into_iter()
            .map(|row| {
                if row.dimension_values.len() != batch.dimensions.len()
                    || row.metric_values.len() != batch.metrics.len()
                {
                    return Err(Self::invalid(format!(
                        "expected {} dimensions and {} metrics, got {} and {}",
                        batch.dimensions.len(),
                        batch.metrics.len(),
                        row.dimension_values.len(),
                        row.metric_values.len()
                    )));
                }
                Ok(row
                    .dimension_values
                    .into_iter()
                    .chain(row.metric_values)
                    .map(|cell| Value::Text(cell.value))
                    .collect::<Row>())
            })
            .collect::<Result<Vec<Row>, ProviderError>>()?;

        let count = rows.len();
        let total = response.row_count.unwrap_or(0);
        debug!(offset, rows = count, total, "GA4 page received");
        let table = ResultTable::from_rows(self.raw_columns(batch), rows)
            .map_err(|e| Self::invalid(e.to_string()))?;

        Ok(Page {
            table,
            next: (count > 0 && offset + count < total).then_some(PageCursor::Offset(offset + count)),
            info: PageInfo {
                total_rows: response.row_count,
                quota: response.property_quota.map(Into::into),
                currency_code: response.metadata.currency_code,
                time_zone: response.metadata.time_zone,
                ..PageInfo::default()
            },
        })
    }
}
