// ABOUTME: Request-side models for reporting fetches
// ABOUTME: Providers, client scope, date ranges, fetch requests and metric batches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Reporting providers
mod provider;

/// Validated fetch requests and the batches derived from them
mod request;

pub use provider::ProviderKind;
pub use request::{
    Batch, ClientScope, DateRange, FetchOptions, FetchRequest, FetchRequestBuilder,
    TruncationPolicy,
};
