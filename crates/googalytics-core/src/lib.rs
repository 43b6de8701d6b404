// ABOUTME: Core types and constants for the googalytics reporting workspace
// ABOUTME: Foundation crate with result tables, request models, pagination and errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Googalytics Core
//!
//! Foundation crate providing the shared types used by the provider adapters and
//! the fetch pipeline. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: `ProviderError`, `FetchError` and `TableError`
//! - **constants**: provider limits, default field lists and the ISO-3166 table
//! - **pagination**: page cursors and fetched pages
//! - **table**: the column-tagged `ResultTable` and its cell `Value`
//! - **models**: providers, scopes, date ranges, fetch requests and batches

/// Error taxonomy for provider calls, fetches and table operations
pub mod errors;

/// Provider limits, defaults and lookup tables
pub mod constants;

/// Offset and token based page cursors
pub mod pagination;

/// Column-tagged result table
pub mod table;

/// Request and scope models
pub mod models;

pub use errors::{FetchError, ProviderError, TableError};
pub use models::{
    Batch, ClientScope, DateRange, FetchOptions, FetchRequest, FetchRequestBuilder, ProviderKind,
    TruncationPolicy,
};
pub use pagination::{Page, PageCursor, PageInfo, PropertyQuota, QuotaStatus};
pub use table::{Column, ColumnRole, ResultTable, Row, RowView, TableMetadata, Value};
