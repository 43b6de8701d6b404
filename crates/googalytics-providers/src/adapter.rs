// ABOUTME: Capability interface shared by the reporting adapters
// ABOUTME: Closed Adapter enum dispatching to Search Console, GA3, GA4 and URL inspection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Reporting Adapters
//!
//! Each adapter turns a [`Batch`] and a [`PageCursor`] into one provider call
//! and returns the rows under the provider's own field names. Pagination,
//! batching and normalization happen above this layer.
//!
//! The set of providers is closed, so [`Adapter`] is an enum rather than a
//! registry of trait objects. The [`ReportingAdapter`] trait stays available
//! for the pipeline to be driven by test doubles.

use std::sync::Arc;

use async_trait::async_trait;
use googalytics_core::{
    Batch, ClientScope, Column, DateRange, Page, PageCursor, ProviderError, ProviderKind,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::ga3::Ga3Adapter;
use crate::ga4::Ga4Adapter;
use crate::gsc::GscAdapter;
use crate::spi::{ProviderCapabilities, ProviderLimits};
use crate::transport::RawQuery;
use crate::url_inspection::UrlInspectionAdapter;

/// One reporting API behind a uniform page-request interface
#[async_trait]
pub trait ReportingAdapter: Send + Sync {
    /// Provider served by this adapter
    fn kind(&self) -> ProviderKind;

    /// Capability flags
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::for_provider(self.kind())
    }

    /// Hard API limits
    fn limits(&self) -> ProviderLimits {
        ProviderLimits::for_provider(self.kind())
    }

    /// Raw headers of every page returned for `batch`
    fn raw_columns(&self, batch: &Batch) -> Vec<Column>;

    /// Fetch one page of `batch` starting at `cursor`
    ///
    /// # Errors
    ///
    /// Returns the provider's error; an error is never reported as an empty page
    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError>;
}

/// Closed set of reporting adapters
#[derive(Clone)]
pub enum Adapter {
    /// Search Console search analytics
    Gsc(GscAdapter),
    /// Universal Analytics reporting v4
    Ga3(Ga3Adapter),
    /// GA4 data API
    Ga4(Ga4Adapter),
    /// Search Console URL inspection
    UrlInspection(UrlInspectionAdapter),
}

impl Adapter {
    /// Build the adapter for `provider` on top of `transport`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::ConfigurationError` if `scope` lacks the
    /// property the provider needs
    pub fn for_provider(
        provider: ProviderKind,
        transport: Arc<dyn RawQuery>,
        scope: &ClientScope,
    ) -> Result<Self, ProviderError> {
        let target = scope
            .target_for(provider)
            .ok_or_else(|| ProviderError::ConfigurationError {
                provider: provider.to_string(),
                details: "client scope has no property for this provider".to_owned(),
            })?
            .to_owned();
        Ok(match provider {
            ProviderKind::Gsc => Self::Gsc(GscAdapter::new(transport, target)),
            ProviderKind::Ga3 => Self::Ga3(Ga3Adapter::new(transport, target)),
            ProviderKind::Ga4 => Self::Ga4(Ga4Adapter::new(transport, target)),
            ProviderKind::UrlInspection => {
                Self::UrlInspection(UrlInspectionAdapter::new(transport, target))
            }
        })
    }

    fn inner(&self) -> &dyn ReportingAdapter {
        match self {
            Self::Gsc(adapter) => adapter,
            Self::Ga3(adapter) => adapter,
            Self::Ga4(adapter) => adapter,
            Self::UrlInspection(adapter) => adapter,
        }
    }
}

#[async_trait]
impl ReportingAdapter for Adapter {
    fn kind(&self) -> ProviderKind {
        self.inner().kind()
    }

    fn raw_columns(&self, batch: &Batch) -> Vec<Column> {
        self.inner().raw_columns(batch)
    }

    async fn request_page(
        &self,
        batch: &Batch,
        cursor: &PageCursor,
        page_size: usize,
    ) -> Result<Page, ProviderError> {
        self.inner().request_page(batch, cursor, page_size).await
    }
}

/// Decode a provider response into its wire type
pub(crate) fn decode<T: DeserializeOwned>(
    provider: ProviderKind,
    body: JsonValue,
) -> Result<T, ProviderError> {
    serde_json::from_value(body).map_err(|e| ProviderError::ParseError {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Date range of a batch that must carry one
pub(crate) fn required_range(batch: &Batch) -> Result<DateRange, ProviderError> {
    batch.date_range.ok_or_else(|| ProviderError::InvalidData {
        provider: batch.provider.to_string(),
        field: "date_range".to_owned(),
        reason: "batch has no date range".to_owned(),
    })
}

/// Row offset of an offset-based cursor
pub(crate) fn required_offset(
    provider: ProviderKind,
    cursor: &PageCursor,
) -> Result<usize, ProviderError> {
    cursor.offset().ok_or_else(|| ProviderError::InvalidData {
        provider: provider.to_string(),
        field: "cursor".to_owned(),
        reason: format!("{provider} pages are offset-based, got {cursor}"),
    })
}

/// `YYYY-MM-DD` strings for a date range
pub(crate) fn range_strings(range: DateRange) -> (String, String) {
    (
        range.start.format("%Y-%m-%d").to_string(),
        range.end.format("%Y-%m-%d").to_string(),
    )
}
