// ABOUTME: Reporting API adapters for Search Console, GA3, GA4 and URL inspection
// ABOUTME: Transport seam, HTTP transport with retry, capability flags and a synthetic backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Reporting API adapters and transports.
//!
//! Adapters build provider-native requests and decode provider-native
//! responses into raw [`googalytics_core::ResultTable`] pages. Transports
//! execute the requests: [`http_transport::HttpTransport`] against the live
//! APIs, [`synthetic::SyntheticTransport`] from in-memory records.

pub use googalytics_core::{constants, errors, models, pagination, table};

/// Capability interface and the closed adapter enum
pub mod adapter;
/// Universal Analytics reporting v4 adapter
pub mod ga3;
/// GA4 data API adapter
pub mod ga4;
/// Search Console search analytics adapter
pub mod gsc;
/// Shared HTTP client for reporting API calls
pub mod http_client;
/// reqwest-backed transport
pub mod http_transport;
/// Capability flags and API limits
pub mod spi;
/// Deterministic in-memory transport
pub mod synthetic;
/// Raw query seam between adapters and transports
pub mod transport;
/// Search Console URL inspection adapter
pub mod url_inspection;

pub use adapter::{Adapter, ReportingAdapter};
pub use ga3::Ga3Adapter;
pub use ga4::Ga4Adapter;
pub use gsc::GscAdapter;
pub use http_client::{initialize_shared_client, shared_client, HttpClientConfig};
pub use http_transport::{HttpTransport, RetryConfig};
pub use spi::{ProviderCapabilities, ProviderLimits};
pub use synthetic::{SyntheticRecord, SyntheticTransport};
pub use transport::{ApiBaseUrls, NativeEndpoint, NativeRequest, RawQuery};
pub use url_inspection::{UrlInspectionAdapter, INSPECTION_COLUMNS};
