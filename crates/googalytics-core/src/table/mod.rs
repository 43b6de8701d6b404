// ABOUTME: Column-tagged result table shared by every provider
// ABOUTME: Columns carry a dimension or metric role that survives every projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Result Table
//!
//! A `ResultTable` is an ordered list of named columns, each tagged as a
//! [`ColumnRole::Dimension`] or a [`ColumnRole::Metric`], plus rows of [`Value`]s.
//! Dimension columns form the join key used when metric batches are merged.
//!
//! Invariants enforced by every constructor and mutator:
//! - column names are unique
//! - every row has exactly one value per column

mod join;
mod value;

use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::errors::TableError;
use crate::models::{DateRange, ProviderKind};
use crate::pagination::PropertyQuota;

pub use value::Value;

/// One table row
pub type Row = Vec<Value>;

/// Role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Grouping key
    Dimension,
    /// Aggregated measurement
    Metric,
}

impl Display for ColumnRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension => f.write_str("dimension"),
            Self::Metric => f.write_str("metric"),
        }
    }
}

/// Named, role-tagged column header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Dimension or metric
    pub role: ColumnRole,
}

impl Column {
    /// Dimension column header
    #[must_use]
    pub fn dimension(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Dimension,
        }
    }

    /// Metric column header
    #[must_use]
    pub fn metric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Metric,
        }
    }

    /// Whether this is a dimension column
    #[must_use]
    pub fn is_dimension(&self) -> bool {
        self.role == ColumnRole::Dimension
    }
}

/// Provenance and provider-reported facts about a table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableMetadata {
    /// Provider the rows came from
    pub provider: Option<ProviderKind>,
    /// Requested date range
    pub date_range: Option<DateRange>,
    /// GSC `responseAggregationType`
    pub response_aggregation: Option<String>,
    /// Total row count reported by the provider
    pub reported_row_count: Option<usize>,
    /// GA4 property quota after the last page
    pub quota: Option<PropertyQuota>,
    /// GA4 property currency
    pub currency_code: Option<String>,
    /// GA4 property time zone
    pub time_zone: Option<String>,
    /// Country codes with no ISO-3166 alpha-3 mapping, passed through unchanged
    pub unknown_country_codes: BTreeSet<String>,
    /// Whether the row cap cut the result short
    pub truncated: bool,
}

impl TableMetadata {
    /// Fold another table's metadata into this one
    pub fn absorb(&mut self, other: &Self) {
        if self.provider.is_none() {
            self.provider = other.provider;
        }
        if self.date_range.is_none() {
            self.date_range = other.date_range;
        }
        if self.response_aggregation.is_none() {
            self.response_aggregation.clone_from(&other.response_aggregation);
        }
        self.reported_row_count = match (self.reported_row_count, other.reported_row_count) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        if other.quota.is_some() {
            self.quota.clone_from(&other.quota);
        }
        if self.currency_code.is_none() {
            self.currency_code.clone_from(&other.currency_code);
        }
        if self.time_zone.is_none() {
            self.time_zone.clone_from(&other.time_zone);
        }
        self.unknown_country_codes
            .extend(other.unknown_country_codes.iter().cloned());
        self.truncated |= other.truncated;
    }
}

/// Borrowed view of one row with name-based access
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [Column],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    /// Value of the named column
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Text content of the named column
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Numeric content of the named column
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Raw values in column order
    #[must_use]
    pub const fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// Ordered, role-tagged table of values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    metadata: TableMetadata,
}

impl ResultTable {
    /// Create an empty table with the given headers
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateColumn` if two headers share a name
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            metadata: TableMetadata::default(),
        })
    }

    /// Create a table from headers and rows
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate headers or a row of the wrong length
    pub fn from_rows(columns: Vec<Column>, rows: Vec<Row>) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        table.extend_rows(rows)?;
        Ok(table)
    }

    /// Column headers in order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of the dimension columns, in order
    #[must_use]
    pub fn dimensions(&self) -> Vec<&str> {
        self.names_with_role(ColumnRole::Dimension)
    }

    /// Names of the metric columns, in order
    #[must_use]
    pub fn metrics(&self) -> Vec<&str> {
        self.names_with_role(ColumnRole::Metric)
    }

    fn names_with_role(&self, role: ColumnRole) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// All rows
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table into its rows
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Iterate rows with name-based access
    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Provenance metadata
    #[must_use]
    pub const fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Mutable provenance metadata
    pub fn metadata_mut(&mut self) -> &mut TableMetadata {
        &mut self.metadata
    }

    /// Replace the metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: TableMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Position of the named column
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Whether the named column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Role of the named column
    #[must_use]
    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.column_index(name).map(|idx| self.columns[idx].role)
    }

    /// Values of the named column, top to bottom
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Single cell by row index and column name
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Append one row
    ///
    /// # Errors
    ///
    /// Returns `TableError::RowLength` if the row does not match the headers
    pub fn push_row(&mut self, row: Row) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append many rows
    ///
    /// # Errors
    ///
    /// Returns `TableError::RowLength` on the first row that does not match
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) -> Result<(), TableError> {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    /// Insert a column at `index` with one value per existing row
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate name or a value count that differs from
    /// the row count
    pub fn insert_column(
        &mut self,
        index: usize,
        column: Column,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        if self.has_column(&column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if values.len() != self.rows.len() {
            return Err(TableError::RowLength {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
        Ok(())
    }

    /// Append a column at the end
    ///
    /// # Errors
    ///
    /// See [`ResultTable::insert_column`]
    pub fn add_column(&mut self, column: Column, values: Vec<Value>) -> Result<(), TableError> {
        self.insert_column(self.columns.len(), column, values)
    }

    /// Insert a column computed from each row
    ///
    /// The new column goes right after `after` when given, otherwise at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if `after` does not exist or `column` is already present
    pub fn derive_column<F>(
        &mut self,
        column: Column,
        after: Option<&str>,
        mut derive: F,
    ) -> Result<(), TableError>
    where
        F: FnMut(RowView<'_>) -> Value,
    {
        let index = match after {
            Some(name) => {
                self.column_index(name)
                    .ok_or_else(|| TableError::UnknownColumn(name.to_owned()))?
                    + 1
            }
            None => self.columns.len(),
        };
        let values: Vec<Value> = self.iter().map(&mut derive).collect();
        self.insert_column(index, column, values)
    }

    /// Keep only rows matching the predicate
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(RowView<'_>) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|values| {
            keep(RowView {
                columns,
                values,
            })
        });
    }

    /// New table with the rows matching the predicate
    #[must_use]
    pub fn filter_rows<F>(&self, keep: F) -> Self
    where
        F: FnMut(RowView<'_>) -> bool,
    {
        let mut filtered = self.clone();
        filtered.retain_rows(keep);
        filtered
    }

    /// New table with the rows whose metric satisfies the predicate
    ///
    /// Rows with a null metric never match.
    ///
    /// # Errors
    ///
    /// Returns an error if `metric` is not a metric column
    pub fn filter_metric<F>(&self, metric: &str, predicate: F) -> Result<Self, TableError>
    where
        F: Fn(f64) -> bool,
    {
        let idx = self
            .column_index(metric)
            .filter(|idx| self.columns[*idx].role == ColumnRole::Metric)
            .ok_or_else(|| TableError::UnknownColumn(metric.to_owned()))?;
        Ok(self.filter_rows(|row| row.values()[idx].as_f64().is_some_and(&predicate)))
    }

    /// Replace null metric cells with `value`
    pub fn fill_null_metrics(&mut self, value: f64) {
        let metric_indices: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == ColumnRole::Metric)
            .map(|(idx, _)| idx)
            .collect();
        for row in &mut self.rows {
            for idx in &metric_indices {
                if row[*idx].is_null() {
                    row[*idx] = Value::Float(value);
                }
            }
        }
    }

    /// Rename a column, keeping its role
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is missing or `to` already exists
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), TableError> {
        if from == to {
            return Ok(());
        }
        if self.has_column(to) {
            return Err(TableError::DuplicateColumn(to.to_owned()));
        }
        let idx = self
            .column_index(from)
            .ok_or_else(|| TableError::UnknownColumn(from.to_owned()))?;
        to.clone_into(&mut self.columns[idx].name);
        Ok(())
    }

    /// Remove the named columns
    ///
    /// # Errors
    ///
    /// Returns an error if any name is missing; the table is unchanged then
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<(), TableError> {
        if let Some(missing) = names.iter().find(|n| !self.has_column(n)) {
            return Err(TableError::UnknownColumn((*missing).to_owned()));
        }
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.name.as_str()))
            .collect();
        let mut flags = keep.iter();
        self.columns.retain(|_| flags.next().copied().unwrap_or(true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| flags.next().copied().unwrap_or(true));
        }
        Ok(())
    }

    /// Reorder columns to `names`; every existing column must be listed once
    ///
    /// # Errors
    ///
    /// Returns `TableError::ColumnMismatch` if `names` is not a permutation
    pub fn reorder_columns(&mut self, names: &[&str]) -> Result<(), TableError> {
        if names.len() != self.columns.len() {
            return Err(TableError::ColumnMismatch(format!(
                "expected {} columns in new order, got {}",
                self.columns.len(),
                names.len()
            )));
        }
        let order = names
            .iter()
            .map(|n| {
                self.column_index(n)
                    .ok_or_else(|| TableError::UnknownColumn((*n).to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if order.iter().collect::<HashSet<_>>().len() != order.len() {
            return Err(TableError::ColumnMismatch(
                "new column order repeats a column".to_owned(),
            ));
        }
        self.columns = order.iter().map(|idx| self.columns[*idx].clone()).collect();
        for row in &mut self.rows {
            *row = order.iter().map(|idx| row[*idx].clone()).collect();
        }
        Ok(())
    }

    /// Append another table's rows
    ///
    /// # Errors
    ///
    /// Returns `TableError::ColumnMismatch` unless both tables have the same
    /// headers in the same order
    pub fn concat(&mut self, other: Self) -> Result<(), TableError> {
        if self.columns != other.columns {
            return Err(TableError::ColumnMismatch(format!(
                "cannot concatenate [{}] with [{}]",
                self.column_names().join(", "),
                other.column_names().join(", ")
            )));
        }
        self.metadata.absorb(&other.metadata);
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Rows as JSON objects keyed by column name
    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, JsonValue>> {
        self.iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.values())
                    .map(|(c, v)| {
                        (
                            c.name.clone(),
                            serde_json::to_value(v).unwrap_or(JsonValue::Null),
                        )
                    })
                    .collect()
            })
            .collect()
    }
}
