// ABOUTME: Search Console search analytics adapter
// ABOUTME: Offset pagination via startRow/rowLimit over the searchAnalytics/query method
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
use serde_json::json;
use tracing::{debug, instrument};

use crate::adapter::{decode, range_strings, required_offset, required_range, ReportingAdapter};
use crate::transport::{NativeEndpoint, NativeRequest, RawQuery};

/// `searchAnalytics/query` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchAnalyticsResponse {
    #[serde(default)]
    rows: Vec<SearchAnalyticsRow>,
    response_aggregation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchAnalyticsRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
    #[serde(default)]
    ctr: f64,
    #[serde(default)]
    position: f64,
}

impl SearchAnalyticsRow {
    fn metric(&self, name: &str) -> Value {
        match name {
            "clicks" => Value::Float(self.clicks),
            "impressions" => Value::Float(self.impressions),
            "ctr" => Value::Float(self.ctr),
            "position" => Value::Float(self.position),
            _ => Value::Null,
        }
    }
}

/// Search Console search analytics adapter
#[derive(Clone)]
pub struct GscAdapter {
    transport: Arc<dyn RawQuery>,
    site_url: String,
}

impl GscAdapter {
    /// Adapter for one Search Console property
    #[must_use]
    pub fn new(transport: Arc<dyn RawQuery>, site_url: impl Into<String>) -> Self {
        Self {
            transport,
            site_url: site_url.into(),
        }
    }

    /// Property queried by this adapter
    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    fn build_request(
        &self,
        batch: &Batch,
        start_row: usize,
        row_limit: usize,
    ) -> Result<NativeRequest, ProviderError> {
        let (start_date, end_date) = range_strings(required_range(batch)?);
        Ok(NativeRequest {
            endpoint: NativeEndpoint::SearchAnalyticsQuery {
                site_url: self.site_url.clone(),
            },
            body: json!({
                "startDate": start_date,
                "endDate": end_date,
                "dimensions": batch.dimensions,
                "rowLimit": row_limit,
                "startRow": start_row,
            }),
        })
    }
}

#[async_trait]
impl ReportingAdapter for GscAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gsc
    }

    fn raw_columns(&self, batch: &Batch) -> Vec<Column> {
        batch
            .dimensions
            .iter()
            .map(Column::dimension)
            .chain(batch.metrics.iter().map(Column::metric))
            .collect()
    }

    #[instrument(skip(self, batch), fields(site = %self.site_url, batch = batch.index))]
    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError> {
        let start_row = required_offset(ProviderKind::Gsc, cursor)?;
        let request = self.build_request(batch, start_row, page_size)?;
        let response: SearchAnalyticsResponse =
            decode(ProviderKind::Gsc, self.transport.raw_query(&request).await?)?;

        let rows = response
            .rows
            .iter()
            .map(|row| {
                if row.keys.len() != batch.dimensions.len() {
                    return Err(ProviderError::InvalidData {
                        provider: ProviderKind::Gsc.to_string(),
                        field: "keys".to_owned(),
                        reason: format!(
                            "expected {} keys, got {}",
                            batch.dimensions.len(),
                            row.keys.len()
                        ),
                    });
                }
                let mut values: Row = row.keys.iter().map(Value::text).collect();
                values.extend(batch.metrics.iter().map(|m| row.metric(m)));
                Ok(values)
            })
            .collect::<Result<Vec<Row>, ProviderError>>()?;

        let count = rows.len();
        debug!(start_row, rows = count, "Search Console page received");
        let table = ResultTable::from_rows(self.raw_columns(batch), rows).map_err(|e| {
            ProviderError::InvalidData {
                provider: ProviderKind::Gsc.to_string(),
                field: "rows".to_owned(),
                reason: e.to_string(),
            }
        })?;

        Ok(Page {
            table,
            next: (count > 0).then_some(PageCursor::Offset(start_row + count)),
            info: PageInfo {
                response_aggregation: response.response_aggregation_type,
                ..PageInfo::default()
            },
        })
    }
}
