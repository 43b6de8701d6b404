// ABOUTME: Library entry point for the googalytics reporting client
// ABOUTME: Fetches Search Console and Google Analytics reports into one normalized table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Googalytics
//!
//! Client-side aggregation over Google Search Console, Universal Analytics
//! (GA3), GA4 and the Search Console URL inspection API. Every report comes
//! back as a [`ResultTable`] whose columns carry an explicit dimension or
//! metric role and share one snake_case schema across providers.
//!
//! ## Pipeline
//!
//! - **partitioner**: splits metric lists into per-call batches and outer-joins
//!   the batch tables on their dimensions
//! - **paginator**: drives one batch page by page up to the row cap
//! - **normalizer**: maps provider field names and codes onto the shared schema
//! - **augment**: derived boolean columns and the Google-organic filter
//! - **client**: the [`AnalyticsSession`] tying it together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use googalytics::{AnalyticsSession, ClientScope, ReportKind, ReportQuery};
//! use googalytics::providers::HttpTransport;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("ya29.token"));
//! let scope = ClientScope::default().with_sc_domain("sc-domain:example.com");
//! let session = AnalyticsSession::new(transport, scope);
//!
//! let table = session.get_df(ReportQuery::new(ReportKind::Gsc)).await?;
//! println!("{} rows, columns {:?}", table.len(), table.column_names());
//! # Ok(())
//! # }
//! ```

/// Derived boolean columns and row filters
pub mod augment;

/// Analytics session and report queries
pub mod client;

/// Environment-driven fetch configuration
pub mod config;

/// Date coverage helpers
pub mod date_utils;

/// Tracing subscriber setup
pub mod logging;

/// Canonical schema mapping
pub mod normalizer;

/// Page-by-page fetching of one batch
pub mod paginator;

/// Metric batching and batch merge
pub mod partitioner;

pub use googalytics_providers as providers;

pub use client::{
    AnalyticsSession, ApiState, ApiStatus, ProviderSummary, ReportKind, ReportQuery,
    SessionSummary,
};
pub use config::FetchConfig;
pub use googalytics_core::{
    ClientScope, Column, ColumnRole, DateRange, FetchError, FetchOptions, FetchRequest,
    ProviderError, ProviderKind, ResultTable, TableError, TruncationPolicy, Value,
};
pub use logging::LoggingConfig;
