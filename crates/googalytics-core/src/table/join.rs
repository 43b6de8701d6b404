// ABOUTME: Full outer join of two result tables on their dimension columns
// ABOUTME: Used to merge metric batches that share one set of dimensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::{HashMap, HashSet};

use super::{Column, ColumnRole, ResultTable, Row, Value};
use crate::errors::TableError;

/// Rows of one table grouped by dimension key, in order of first appearance
struct KeyedRows {
    order: Vec<Row>,
    groups: HashMap<Row, Vec<Row>>,
}

impl KeyedRows {
    fn build(table: &ResultTable, key_indices: &[usize], metric_indices: &[usize]) -> Self {
        let mut order = Vec::new();
        let mut groups: HashMap<Row, Vec<Row>> = HashMap::new();
        for row in table.rows() {
            let key: Row = key_indices.iter().map(|idx| row[*idx].clone()).collect();
            let metrics: Row = metric_indices.iter().map(|idx| row[*idx].clone()).collect();
            groups
                .entry(key)
                .or_insert_with_key(|key| {
                    order.push(key.clone());
                    Vec::new()
                })
                .push(metrics);
        }
        Self { order, groups }
    }
}

fn metric_indices(table: &ResultTable) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.role == ColumnRole::Metric)
        .map(|(idx, _)| idx)
        .collect()
}

impl ResultTable {
    /// Full outer join on the dimension columns
    ///
    /// Both tables must carry the same set of dimension columns (in any order)
    /// and disjoint metric columns. The result has the dimensions in `self`'s
    /// order, then `self`'s metrics, then `other`'s metrics. A dimension tuple
    /// missing from one side gets `Null` for that side's metrics. Rows appear in
    /// order of first appearance, scanning `self` before `other`.
    ///
    /// # Errors
    ///
    /// Returns `TableError::ColumnMismatch` if the dimension sets differ or a
    /// metric appears on both sides
    pub fn outer_join(&self, other: &Self) -> Result<Self, TableError> {
        let left_dims = self.dimensions();
        let right_dims = other.dimensions();
        let left_set: HashSet<&str> = left_dims.iter().copied().collect();
        let right_set: HashSet<&str> = right_dims.iter().copied().collect();
        if left_set != right_set {
            return Err(TableError::ColumnMismatch(format!(
                "unmatched join dimensions [{}] and [{}]",
                left_dims.join(", "),
                right_dims.join(", ")
            )));
        }
        if let Some(shared) = self.metrics().into_iter().find(|m| other.has_column(m)) {
            return Err(TableError::ColumnMismatch(format!(
                "metric '{shared}' present in both tables"
            )));
        }

        let left_keys: Vec<usize> = left_dims
            .iter()
            .filter_map(|d| self.column_index(d))
            .collect();
        let right_keys: Vec<usize> = left_dims
            .iter()
            .filter_map(|d| other.column_index(d))
            .collect();
        let left_metrics = metric_indices(self);
        let right_metrics = metric_indices(other);

        let mut columns: Vec<Column> = left_keys.iter().map(|i| self.columns[*i].clone()).collect();
        columns.extend(left_metrics.iter().map(|i| self.columns[*i].clone()));
        columns.extend(right_metrics.iter().map(|i| other.columns[*i].clone()));

        let left = KeyedRows::build(self, &left_keys, &left_metrics);
        let mut right = KeyedRows::build(other, &right_keys, &right_metrics);
        let left_gap = vec![Value::Null; left_metrics.len()];
        let right_gap = vec![Value::Null; right_metrics.len()];

        let mut rows = Vec::with_capacity(left.order.len().max(right.order.len()));
        for key in &left.order {
            let left_group = left.groups.get(key).map(Vec::as_slice).unwrap_or_default();
            let right_group = right.groups.remove(key);
            for left_values in left_group {
                match &right_group {
                    Some(group) => {
                        for right_values in group {
                            rows.push(joined(key, left_values, right_values));
                        }
                    }
                    None => rows.push(joined(key, left_values, &right_gap)),
                }
            }
        }
        for key in &right.order {
            if let Some(group) = right.groups.get(key) {
                for right_values in group {
                    rows.push(joined(key, &left_gap, right_values));
                }
            }
        }

        let mut merged = Self::from_rows(columns, rows)?;
        let mut metadata = self.metadata.clone();
        metadata.absorb(&other.metadata);
        merged.metadata = metadata;
        Ok(merged)
    }
}

fn joined(key: &[Value], left: &[Value], right: &[Value]) -> Row {
    let mut row = Vec::with_capacity(key.len() + left.len() + right.len());
    row.extend_from_slice(key);
    row.extend_from_slice(left);
    row.extend_from_slice(right);
    row
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table(metric: &str, rows: &[(&str, f64)]) -> ResultTable {
        ResultTable::from_rows(
            vec![Column::dimension("page"), Column::metric(metric)],
            rows.iter()
                .map(|(page, v)| vec![Value::text(*page), Value::Float(*v)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_outer_join_fills_gaps_with_null() {
        let a = table("clicks", &[("/a", 1.0), ("/b", 2.0)]);
        let b = table("impressions", &[("/b", 20.0), ("/c", 30.0)]);
        let merged = a.outer_join(&b).unwrap();

        assert_eq!(merged.column_names(), vec!["page", "clicks", "impressions"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.value(0, "impressions"), Some(&Value::Null));
        assert_eq!(merged.value(1, "impressions"), Some(&Value::Float(20.0)));
        assert_eq!(merged.value(2, "clicks"), Some(&Value::Null));
    }

    #[test]
    fn test_outer_join_rejects_mismatched_dimensions() {
        let a = table("clicks", &[("/a", 1.0)]);
        let b = ResultTable::new(vec![Column::dimension("query"), Column::metric("ctr")]).unwrap();
        assert!(matches!(
            a.outer_join(&b),
            Err(TableError::ColumnMismatch(_))
        ));
    }
}
