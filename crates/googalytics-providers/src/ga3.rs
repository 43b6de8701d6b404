// ABOUTME: Universal Analytics (GA3) reporting v4 adapter
// ABOUTME: Token pagination over reports:batchGet with optional Google-organic filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use async_trait::async_trait;
use googalytics_core::{
    Batch, Column, Page, PageCursor, PageInfo, ProviderError, ProviderKind, ResultTable, Row,
    Value,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, instrument};

use crate::adapter::{decode, range_strings, required_range, ReportingAdapter};
use crate::transport::{NativeEndpoint, NativeRequest, RawQuery};

/// Metric the report is ordered by when requested
const ORDER_BY_METRIC: &str = "ga:itemRevenue";

/// Value of `ga:sourceMedium` for Google organic traffic
const GOOGLE_ORGANIC: &str = "google / organic";

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    #[serde(default)]
    data: ReportData,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportData {
    #[serde(default)]
    rows: Vec<ReportRow>,
    row_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metrics: Vec<DateRangeValues>,
}

#[derive(Debug, Deserialize)]
struct DateRangeValues {
    #[serde(default)]
    values: Vec<String>,
}

/// GA3 reporting v4 adapter
#[derive(Clone)]
pub struct Ga3Adapter {
    transport: Arc<dyn RawQuery>,
    view_id: String,
}

impl Ga3Adapter {
    /// Adapter for one GA3 view
    #[must_use]
    pub fn new(transport: Arc<dyn RawQuery>, view_id: impl Into<String>) -> Self {
        Self {
            transport,
            view_id: view_id.into(),
        }
    }

    fn build_request(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<NativeRequest, ProviderError> {
        let (start_date, end_date) = range_strings(required_range(batch)?);
        let mut report = json!({
            "viewId": self.view_id,
            "dateRanges": [{ "startDate": start_date, "endDate": end_date }],
            "dimensions": batch.dimensions.iter().map(|d| json!({ "name": d })).collect::<Vec<_>>(),
            "metrics": batch.metrics.iter().map(|m| json!({ "expression": m })).collect::<Vec<_>>(),
            "pageSize": page_size,
        });
        let token = match cursor {
            PageCursor::Offset(0) => None,
            PageCursor::Offset(offset) => Some(offset.to_string()),
            PageCursor::Token(token) => Some(token.clone()),
        };
        if let Some(map) = report.as_object_mut() {
            if let Some(token) = token {
                map.insert("pageToken".to_owned(), JsonValue::String(token));
            }
            if batch.filter_google_organic {
                map.insert(
                    "dimensionFilterClauses".to_owned(),
                    json!([{
                        "operator": "AND",
                        "filters": [{
                            "dimensionName": "ga:sourceMedium",
                            "operator": "EXACT",
                            "expressions": [GOOGLE_ORGANIC],
                        }],
                    }]),
                );
            }
            if batch.metrics.iter().any(|m| m == ORDER_BY_METRIC) {
                map.insert(
                    "orderBys".to_owned(),
                    json!([{ "fieldName": ORDER_BY_METRIC, "sortOrder": "DESCENDING" }]),
                );
            }
        }
        Ok(NativeRequest {
            endpoint: NativeEndpoint::ReportsBatchGet,
            body: json!({ "reportRequests": [report] }),
        })
    }

    fn invalid(field: &str, reason: String) -> ProviderError {
        ProviderError::InvalidData {
            provider: ProviderKind::Ga3.to_string(),
            field: field.to_owned(),
            reason,
        }
    }
}

#[async_trait]
impl ReportingAdapter for Ga3Adapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ga3
    }

    fn raw_columns(&self, batch: &Batch) -> Vec<Column> {
        batch
            .dimensions
            .iter()
            .map(Column::dimension)
            .chain(batch.metrics.iter().map(Column::metric))
            .collect()
    }

    #[instrument(skip(self, batch), fields(view = %self.view_id, batch = batch.index))]
    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError> {
        let request = self.build_request(batch, cursor, page_size)?;
        let response: BatchGetResponse =
            decode(ProviderKind::Ga3, self.transport.raw_query(&request).await?)?;
        let report = response
            .reports
            .into_iter()
            .next()
            .ok_or_else(|| Self::invalid("reports", "response has no report".to_owned()))?;

        let rows = report
            .data
            .rows
            .into_iter()
            .map(|row| {
                let values = row.metrics.into_iter().next().map(|m| m.values).unwrap_or_default();
                if row.dimensions.len() != batch.dimensions.len()
                    || values.len() != batch.metrics.len()
                {
                    return Err(Self::invalid(
                        "rows",
                        format!(
                            "expected {} dimensions and {} metrics, got {} and {}",
                            batch.dimensions.len(),
                            batch.metrics.len(),
                            row.dimensions.len(),
                            values.len()
                        ),
                    ));
                }
                Ok(row
                    .dimensions
                    .into_iter()
                    .chain(values)
                    .map(Value::Text)
                    .collect::<Row>())
            })
            .collect::<Result<Vec<Row>, ProviderError>>()?;

        debug!(rows = rows.len(), cursor = %cursor, "GA3 page received");
        let table = ResultTable::from_rows(self.raw_columns(batch), rows)
            .map_err(|e| Self::invalid("rows", e.to_string()))?;

        Ok(Page {
            table,
            next: report.next_page_token.map(PageCursor::Token),
            info: PageInfo {
                total_rows: report.data.row_count,
                ..PageInfo::default()
            },
        })
    }
}
