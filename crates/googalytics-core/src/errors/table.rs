// ABOUTME: Errors raised while building, reshaping or joining result tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use thiserror::Error;

/// Error raised by a `ResultTable` operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two columns share a name
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one value per column
    #[error("row has {actual} values but the table has {expected} columns")]
    RowLength {
        /// Number of columns
        expected: usize,
        /// Number of values in the row
        actual: usize,
    },

    /// A named column does not exist
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Two tables cannot be combined
    #[error("column mismatch: {0}")]
    ColumnMismatch(String),
}
