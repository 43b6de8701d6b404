// ABOUTME: Maps raw provider tables onto the shared canonical schema
// ABOUTME: Renames and splits dimensions, parses metrics and records unknown country codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Schema Normalizer
//!
//! Raw pages come back under provider field names (`ga:landingPagePath`,
//! `sessionSourceMedium`, `page`, ...). Normalization turns them into one
//! snake_case schema in which the same column name always carries the same
//! kind of value, whichever provider produced it:
//!
//! - `record_date` is always a [`Value::Date`]
//! - `country_iso_code` is always an upper-case ISO-3166 alpha-3 code, or the
//!   provider's code unchanged when it has no mapping
//! - `landing_page` is always a path without domain or query string
//! - metrics are always [`Value::Float`] or [`Value::Null`]
//!
//! Column roles survive normalization: every column derived from a raw
//! dimension is a dimension, every metric stays a metric.

mod fields;
mod values;

use std::collections::{BTreeSet, HashSet};

use googalytics_core::{
    Column, ColumnRole, DateRange, FetchError, FetchRequest, ProviderKind, ResultTable, Row, Value,
};
use tracing::{debug, warn};

pub use fields::{
    canonical_dimensions, canonical_metric, DimensionRule, RECORD_DATE, RECORD_DATE_START,
};
pub use values::{
    camel_to_snake, clean_product_name, split_source_medium, url_parameter, url_path,
    url_path_without_query,
};

/// How one raw column is carried into the canonical table
enum ColumnPlan {
    Dimension(DimensionRule),
    Metric,
}

/// Normalize a raw table returned by `provider`
///
/// When the result has no `record_date` column and `date_range` is known,
/// constant `record_date_start` and `record_date` dimensions are prepended so
/// date-less reports still join on their reporting window.
///
/// # Errors
///
/// Returns `FetchError::InternalInconsistency` if the canonical columns collide
pub fn normalize(
    raw: ResultTable,
    provider: ProviderKind,
    date_range: Option<DateRange>,
) -> Result<ResultTable, FetchError> {
    let mut columns = Vec::with_capacity(raw.columns().len());
    let mut plans = Vec::with_capacity(raw.columns().len());
    for column in raw.columns() {
        match column.role {
            ColumnRole::Dimension => {
                let rule = DimensionRule::for_field(provider, &column.name);
                columns.extend(rule.outputs().into_iter().map(Column::dimension));
                plans.push(ColumnPlan::Dimension(rule));
            }
            ColumnRole::Metric => {
                columns.push(Column::metric(canonical_metric(provider, &column.name)));
                plans.push(ColumnPlan::Metric);
            }
        }
    }

    let mut metadata = raw.metadata().clone();
    let mut unknown = BTreeSet::new();
    let raw_rows = raw.len();
    let rows: Vec<Row> = raw
        .into_rows()
        .into_iter()
        .filter_map(|row| normalize_row(&plans, &row, &mut unknown))
        .collect();
    if rows.len() < raw_rows {
        debug!(
            provider = %provider,
            dropped = raw_rows - rows.len(),
            "Dropped rows reported under an (other) date"
        );
    }

    for code in unknown.difference(&metadata.unknown_country_codes) {
        warn!(provider = %provider, code = %code, "Unknown country code passed through");
    }
    metadata.unknown_country_codes.extend(unknown);
    if metadata.provider.is_none() {
        metadata.provider = Some(provider);
    }
    if metadata.date_range.is_none() {
        metadata.date_range = date_range;
    }

    let mut table = ResultTable::from_rows(columns, rows)?.with_metadata(metadata);
    if let Some(range) = date_range {
        if !table.has_column(RECORD_DATE) {
            let count = table.len();
            table.insert_column(
                0,
                Column::dimension(RECORD_DATE),
                vec![Value::Date(range.end); count],
            )?;
            table.insert_column(
                0,
                Column::dimension(RECORD_DATE_START),
                vec![Value::Date(range.start); count],
            )?;
        }
    }
    Ok(table)
}

fn normalize_row(
    plans: &[ColumnPlan],
    row: &[Value],
    unknown: &mut BTreeSet<String>,
) -> Option<Row> {
    let mut out = Vec::with_capacity(row.len() + 4);
    for (plan, value) in plans.iter().zip(row) {
        match plan {
            ColumnPlan::Dimension(rule) => out.extend(rule.apply(value, unknown)?),
            ColumnPlan::Metric => out.push(metric_cell(value)),
        }
    }
    Some(out)
}

fn metric_cell(value: &Value) -> Value {
    match value {
        Value::Boolean(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64().map_or(Value::Null, Value::Float),
    }
}

/// Check that the request's fields map to distinct canonical columns
///
/// # Errors
///
/// Returns `FetchError::InvalidRequest` naming the first colliding column
pub fn validate_canonical_names(request: &FetchRequest) -> Result<(), FetchError> {
    let provider = request.provider();
    let mut seen = HashSet::new();
    let dimensions = canonical_dimensions(provider, request.dimensions());
    let metrics = request
        .metrics()
        .iter()
        .map(|m| canonical_metric(provider, m));
    for name in dimensions.into_iter().chain(metrics) {
        if !seen.insert(name.clone()) {
            return Err(FetchError::invalid(format!(
                "more than one requested field maps to column '{name}'"
            )));
        }
    }
    Ok(())
}
