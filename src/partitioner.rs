// ABOUTME: Splits metric lists into per-call batches and merges the batch tables
// ABOUTME: Batches run in order or concurrently and are outer-joined on their dimensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Metric Partitioner
//!
//! GA3 and GA4 accept at most ten metrics per report. A request for more is cut
//! into consecutive chunks, each chunk is fetched as its own [`Batch`] carrying
//! every requested dimension, and the normalized batch tables are outer-joined
//! on their dimension columns. Row order is the order of first appearance
//! scanning batches in chunk order, so the result does not depend on timing
//! when batches run concurrently.

use futures_util::future::try_join_all;
use googalytics_core::{Batch, FetchError, FetchRequest, ResultTable};
use googalytics_providers::ReportingAdapter;
use tracing::{debug, info, instrument};

use crate::config::FetchConfig;
use crate::normalizer::{normalize, validate_canonical_names};
use crate::paginator::{fetch_all, PaginationConfig};

/// Consecutive chunks of at most `max_per_call` metrics, order preserved
///
/// A limit of zero is treated as one.
#[must_use]
pub fn partition(metrics: &[String], max_per_call: usize) -> Vec<Vec<String>> {
    metrics
        .chunks(max_per_call.max(1))
        .map(<[String]>::to_vec)
        .collect()
}

/// Batches for `request`, one per metric chunk
///
/// Providers that do not batch metrics get a single batch with every metric.
#[must_use]
pub fn plan_batches(
    adapter: &dyn ReportingAdapter,
    request: &FetchRequest,
    config: &FetchConfig,
) -> Vec<Batch> {
    let metrics = request.metrics();
    if metrics.is_empty() || !adapter.capabilities().batches_metrics() {
        return vec![request.batch(0, metrics.to_vec())];
    }
    let per_call = config
        .max_metrics_per_call
        .min(adapter.limits().max_metrics_per_call);
    partition(metrics, per_call)
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| request.batch(index, chunk))
        .collect()
}

/// Fetch, normalize and merge every batch of `request`
///
/// # Errors
///
/// Returns `FetchError::InvalidRequest` before any I/O when two fields map to
/// the same canonical column, the first batch failure otherwise, and
/// `FetchError::InternalInconsistency` if batch tables cannot be joined
#[instrument(skip_all, fields(provider = %request.provider()))]
pub async fn fetch(
    adapter: &dyn ReportingAdapter,
    request: &FetchRequest,
    config: &FetchConfig,
) -> Result<ResultTable, FetchError> {
    validate_canonical_names(request)?;

    let batches = plan_batches(adapter, request, config);
    let pagination = PaginationConfig::for_request(request, config, adapter.limits());
    let concurrent = request.options().concurrent_batches || config.concurrent_batches;
    debug!(
        batches = batches.len(),
        page_size = pagination.page_size,
        row_cap = ?pagination.row_cap,
        concurrent,
        "Planned metric batches"
    );

    let tables = if concurrent && batches.len() > 1 {
        try_join_all(
            batches
                .iter()
                .map(|batch| fetch_batch(adapter, batch, pagination)),
        )
        .await?
    } else {
        let mut tables = Vec::with_capacity(batches.len());
        for batch in &batches {
            tables.push(fetch_batch(adapter, batch, pagination).await?);
        }
        tables
    };

    let table = merge(tables)?;
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        batches = batches.len(),
        truncated = table.metadata().truncated,
        "Fetch complete"
    );
    Ok(table)
}

async fn fetch_batch(
    adapter: &dyn ReportingAdapter,
    batch: &Batch,
    pagination: PaginationConfig,
) -> Result<ResultTable, FetchError> {
    let raw = fetch_all(adapter, batch, pagination).await?;
    normalize(raw, batch.provider, batch.date_range)
}

/// Outer-join normalized batch tables on their dimension columns
///
/// # Errors
///
/// Returns `FetchError::InternalInconsistency` if the tables have different
/// dimension sets or share a metric
pub fn merge(tables: Vec<ResultTable>) -> Result<ResultTable, FetchError> {
    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return Err(FetchError::inconsistency("no batch tables to merge"));
    };
    tables.try_fold(first, |merged, next| {
        merged.outer_join(&next).map_err(FetchError::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("metric{i}")).collect()
    }

    #[test]
    fn test_partition_preserves_order() {
        let metrics = names(23);
        let chunks = partition(&metrics, 10);
        assert_eq!(
            chunks.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![10, 10, 3]
        );
        assert_eq!(chunks.concat(), metrics);
    }

    #[test]
    fn test_partition_zero_limit_is_one() {
        assert_eq!(partition(&names(3), 0).len(), 3);
    }

    #[test]
    fn test_merge_of_nothing_is_inconsistent() {
        assert!(matches!(
            merge(Vec::new()),
            Err(FetchError::InternalInconsistency { .. })
        ));
    }
}
