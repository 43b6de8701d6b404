// ABOUTME: Drives a reporting adapter page by page until exhaustion or the row cap
// ABOUTME: Exposes a lazy page stream and an eager fetch_all that concatenates raw pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Paginator
//!
//! Every reporting API returns a bounded page per call. The paginator keeps
//! requesting pages for one [`Batch`] and stops when:
//!
//! - a page holds fewer rows than were asked for,
//! - the adapter reports no next cursor, or
//! - the row cap is reached.
//!
//! Offset providers advance by the number of rows received; GA3 advances with
//! the `nextPageToken` it returned. A provider failure on any page fails the
//! whole batch; nothing fetched before it is returned.

use std::pin::Pin;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use googalytics_core::{
    Batch, FetchError, FetchRequest, Page, PageCursor, PageInfo, ResultTable, TableMetadata,
    TruncationPolicy,
};
use googalytics_providers::{ProviderLimits, ReportingAdapter};
use tracing::{debug, warn};

use crate::config::FetchConfig;

/// Stream of raw pages for one batch
pub type PageStream<'a> = Pin<Box<dyn Stream<Item = Result<Page, FetchError>> + Send + 'a>>;

/// Page size, row cap and truncation behaviour for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Rows requested per page
    pub page_size: usize,
    /// Maximum rows fetched for the batch
    pub row_cap: Option<usize>,
    /// Behaviour when the cap cuts the result short
    pub truncation: TruncationPolicy,
}

impl PaginationConfig {
    /// Configuration with the page size clamped to `[1, limits.max_page_size]`
    #[must_use]
    pub fn new(page_size: usize, limits: ProviderLimits) -> Self {
        Self {
            page_size: page_size.clamp(1, limits.max_page_size.max(1)),
            row_cap: limits.default_row_limit,
            truncation: TruncationPolicy::Allow,
        }
    }

    /// Set the row cap
    #[must_use]
    pub const fn with_row_cap(mut self, row_cap: Option<usize>) -> Self {
        self.row_cap = row_cap;
        self
    }

    /// Set the truncation policy
    #[must_use]
    pub const fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.truncation = truncation;
        self
    }

    /// Configuration for `request` under the session configuration
    ///
    /// The request's row limit wins over the configured one, which wins over
    /// the provider default. Either side asking for `Error` truncation wins.
    #[must_use]
    pub fn for_request(
        request: &FetchRequest,
        config: &FetchConfig,
        limits: ProviderLimits,
    ) -> Self {
        let options = request.options();
        let truncation = if options.truncation == TruncationPolicy::Error
            || config.truncation == TruncationPolicy::Error
        {
            TruncationPolicy::Error
        } else {
            TruncationPolicy::Allow
        };
        Self::new(config.page_size(request.provider()), limits)
            .with_row_cap(
                options
                    .row_limit
                    .or(config.row_limit)
                    .or(limits.default_row_limit),
            )
            .with_truncation(truncation)
    }
}

/// Lazily fetch the pages of `batch`
///
/// Stops after a short page, a page without a next cursor, or at the row cap.
pub fn page_stream<'a>(
    adapter: &'a dyn ReportingAdapter,
    batch: &'a Batch,
    config: PaginationConfig,
) -> PageStream<'a> {
    Box::pin(try_stream! {
        let cap = config.row_cap.unwrap_or(usize::MAX);
        let mut cursor = PageCursor::start();
        let mut fetched: usize = 0;

        while fetched < cap {
            let requested = config.page_size.min(cap - fetched);
            let page = adapter
                .request_page(batch, &cursor, requested)
                .await
                .map_err(|source| FetchError::ProviderFetch {
                    provider: batch.provider,
                    batch: batch.index,
                    page_offset: fetched,
                    source,
                })?;

            let received = page.len();
            if received > requested {
                Err(FetchError::inconsistency(format!(
                    "{} returned {received} rows for a page of {requested}",
                    batch.provider
                )))?;
            }
            debug!(
                provider = %batch.provider,
                batch = batch.index,
                cursor = %cursor,
                rows = received,
                "Page received"
            );
            fetched += received;

            let next = page.next.clone();
            yield page;

            match next {
                Some(next) if received == requested => cursor = next,
                _ => break,
            }
        }
    })
}

/// Fetch every page of `batch` into one raw table
///
/// An empty first page yields an empty table with the batch's raw headers.
///
/// # Errors
///
/// Returns `FetchError::ProviderFetch` when a page fails, or
/// `FetchError::Truncated` when the cap is hit under `TruncationPolicy::Error`
pub async fn fetch_all(
    adapter: &dyn ReportingAdapter,
    batch: &Batch,
    config: PaginationConfig,
) -> Result<ResultTable, FetchError> {
    let mut table = ResultTable::new(adapter.raw_columns(batch))?;
    let mut stream = page_stream(adapter, batch, config);
    let mut has_more = false;

    while let Some(page) = stream.next().await {
        let page = page?;
        absorb_info(table.metadata_mut(), &page.info);
        has_more = page.next.is_some();
        table.concat(page.table)?;
    }

    let truncated = has_more && config.row_cap.is_some_and(|cap| table.len() >= cap);
    if truncated {
        let row_cap = config.row_cap.unwrap_or_default();
        if config.truncation == TruncationPolicy::Error {
            return Err(FetchError::Truncated {
                provider: batch.provider,
                row_cap,
            });
        }
        warn!(
            provider = %batch.provider,
            batch = batch.index,
            row_cap,
            "Row cap reached, result truncated"
        );
    }

    let metadata = table.metadata_mut();
    metadata.provider = Some(batch.provider);
    metadata.date_range = batch.date_range;
    metadata.truncated = truncated;
    Ok(table)
}

fn absorb_info(metadata: &mut TableMetadata, info: &PageInfo) {
    metadata.absorb(&TableMetadata {
        response_aggregation: info.response_aggregation.clone(),
        reported_row_count: info.total_rows,
        quota: info.quota.clone(),
        currency_code: info.currency_code.clone(),
        time_zone: info.time_zone.clone(),
        ..TableMetadata::default()
    });
}
