// ABOUTME: Tests for the column-tagged result table
// ABOUTME: Shape validation, column reshaping, row filters, joins and JSON records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::day;
use googalytics::{Column, ColumnRole, ResultTable, TableError, Value};
use serde_json::json;

fn pages() -> ResultTable {
    ResultTable::from_rows(
        vec![
            Column::dimension("record_date"),
            Column::dimension("landing_page"),
            Column::metric("sessions"),
        ],
        vec![
            vec![Value::Date(day(2024, 3, 1)), Value::text("/shoes"), Value::Float(10.0)],
            vec![Value::Date(day(2024, 3, 1)), Value::text("/socks"), Value::Null],
            vec![Value::Date(day(2024, 3, 2)), Value::text("/shoes"), Value::Float(3.0)],
        ],
    )
    .unwrap()
}

#[test]
fn test_shape_is_validated() {
    let duplicate = ResultTable::new(vec![Column::dimension("query"), Column::metric("query")]);
    assert_eq!(
        duplicate.unwrap_err(),
        TableError::DuplicateColumn("query".to_owned())
    );

    let mut table = pages();
    let err = table.push_row(vec![Value::Null]).unwrap_err();
    assert_eq!(
        err,
        TableError::RowLength {
            expected: 3,
            actual: 1
        }
    );
    assert_eq!(table.len(), 3);
}

#[test]
fn test_roles_and_lookup() {
    let table = pages();

    assert_eq!(table.dimensions(), vec!["record_date", "landing_page"]);
    assert_eq!(table.metrics(), vec!["sessions"]);
    assert_eq!(table.role_of("sessions"), Some(ColumnRole::Metric));
    assert_eq!(table.role_of("missing"), None);
    assert_eq!(table.value(2, "sessions"), Some(&Value::Float(3.0)));
    assert_eq!(table.value(3, "sessions"), None);
    let row = table.iter().next().unwrap();
    assert_eq!(row.text("landing_page"), Some("/shoes"));
    assert_eq!(row.number("sessions"), Some(10.0));
}

#[test]
fn test_derive_rename_drop_and_reorder() {
    let mut table = pages();

    table
        .derive_column(Column::dimension("is_shoe"), Some("landing_page"), |row| {
            Value::Boolean(row.text("landing_page") == Some("/shoes"))
        })
        .unwrap();
    assert_eq!(
        table.column_names(),
        vec!["record_date", "landing_page", "is_shoe", "sessions"]
    );
    assert_eq!(table.value(1, "is_shoe"), Some(&Value::Boolean(false)));

    table.rename_column("sessions", "visits").unwrap();
    assert_eq!(table.role_of("visits"), Some(ColumnRole::Metric));
    assert_eq!(
        table.rename_column("visits", "landing_page").unwrap_err(),
        TableError::DuplicateColumn("landing_page".to_owned())
    );

    assert!(table.drop_columns(&["is_shoe", "nope"]).is_err());
    assert!(table.has_column("is_shoe"));
    table.drop_columns(&["is_shoe"]).unwrap();

    table
        .reorder_columns(&["visits", "landing_page", "record_date"])
        .unwrap();
    assert_eq!(table.column_names(), vec!["visits", "landing_page", "record_date"]);
    assert_eq!(table.rows()[0][0], Value::Float(10.0));
    assert!(table.reorder_columns(&["visits", "visits", "record_date"]).is_err());
}

#[test]
fn test_metric_filters_and_null_fill() {
    let mut table = pages();

    let busy = table.filter_metric("sessions", |v| v > 5.0).unwrap();
    assert_eq!(busy.len(), 1);
    assert!(table.filter_metric("landing_page", |_| true).is_err());

    table.fill_null_metrics(0.0);
    assert_eq!(table.value(1, "sessions"), Some(&Value::Float(0.0)));
    assert_eq!(table.filter_metric("sessions", |v| v >= 0.0).unwrap().len(), 3);
}

#[test]
fn test_concat_requires_identical_headers() {
    let mut table = pages();
    let other = pages();
    table.concat(other).unwrap();
    assert_eq!(table.len(), 6);

    let mismatched =
        ResultTable::new(vec![Column::dimension("landing_page"), Column::metric("sessions")])
            .unwrap();
    assert!(matches!(
        table.concat(mismatched),
        Err(TableError::ColumnMismatch(_))
    ));
}

#[test]
fn test_outer_join_aligns_dimensions_in_any_order() {
    let left = pages();
    let right = ResultTable::from_rows(
        vec![
            Column::dimension("landing_page"),
            Column::dimension("record_date"),
            Column::metric("revenue"),
        ],
        vec![
            vec![Value::text("/shoes"), Value::Date(day(2024, 3, 2)), Value::Float(99.0)],
            vec![Value::text("/hats"), Value::Date(day(2024, 3, 3)), Value::Float(5.0)],
        ],
    )
    .unwrap();

    let joined = left.outer_join(&right).unwrap();

    assert_eq!(
        joined.column_names(),
        vec!["record_date", "landing_page", "sessions", "revenue"]
    );
    assert_eq!(joined.len(), 4);
    assert_eq!(joined.value(0, "revenue"), Some(&Value::Null));
    assert_eq!(joined.value(2, "revenue"), Some(&Value::Float(99.0)));
    assert_eq!(joined.value(3, "landing_page"), Some(&Value::text("/hats")));
    assert_eq!(joined.value(3, "sessions"), Some(&Value::Null));

    assert!(left.outer_join(&left).is_err());
}

#[test]
fn test_records_serialize_cells() {
    let records = pages().to_records();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["record_date"], json!("2024-03-01"));
    assert_eq!(records[0]["sessions"], json!(10.0));
    assert_eq!(records[1]["sessions"], json!(null));
}
